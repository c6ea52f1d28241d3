//! Yearn Lens oracle: a single `getPriceUsdcRecommended(token)` read
//! returning a USDC-denominated 6-decimal fixed-point price. Highest
//! priority source in the chain.

use async_trait::async_trait;
use ethers::types::Address;
use std::sync::Arc;

use crate::chain::ChainReader;
use crate::config::NetworkConfig;
use crate::errors::PriceError;
use crate::math;
use crate::resolver::{PriceLookup, PriceSource};
use crate::types::{PriceResult, SourceId, USDC_DECIMALS};

pub struct YearnLensOracle {
    config: Arc<NetworkConfig>,
    reader: Arc<dyn ChainReader>,
    /// Fixed-point precision of the oracle's answers.
    decimals: u8,
}

impl YearnLensOracle {
    pub fn new(config: Arc<NetworkConfig>, reader: Arc<dyn ChainReader>) -> Self {
        Self {
            config,
            reader,
            decimals: USDC_DECIMALS,
        }
    }
}

#[async_trait]
impl PriceSource for YearnLensOracle {
    fn id(&self) -> SourceId {
        SourceId::YearnLens
    }

    async fn quote(
        &self,
        token: Address,
        block: u64,
        _lookup: &dyn PriceLookup,
    ) -> Result<PriceResult, PriceError> {
        let oracle = self
            .config
            .contract_for(SourceId::YearnLens, block)
            .ok_or(PriceError::SourceUnavailable { block })?;

        let raw = self
            .reader
            .get_price_usdc_recommended(oracle, token, block)
            .await?;
        if raw.is_zero() {
            // the lens answers zero for tokens it does not track
            return Ok(PriceResult::failure());
        }

        Ok(PriceResult::success(
            math::u256_to_decimal(raw, 0)?,
            self.decimals,
            SourceId::YearnLens,
        ))
    }
}
