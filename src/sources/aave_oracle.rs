//! Aave price oracle: `getAssetPrice(asset)` in 8-decimal USD fixed point.
//! Configured only on networks with an Aave deployment.

use async_trait::async_trait;
use ethers::types::Address;
use std::sync::Arc;

use crate::chain::ChainReader;
use crate::config::NetworkConfig;
use crate::errors::PriceError;
use crate::math;
use crate::resolver::{PriceLookup, PriceSource};
use crate::types::{PriceResult, SourceId};

const AAVE_ORACLE_DECIMALS: u8 = 8;

pub struct AaveOracle {
    config: Arc<NetworkConfig>,
    reader: Arc<dyn ChainReader>,
    /// Fixed-point precision of the oracle's answers.
    decimals: u8,
}

impl AaveOracle {
    pub fn new(config: Arc<NetworkConfig>, reader: Arc<dyn ChainReader>) -> Self {
        Self {
            config,
            reader,
            decimals: AAVE_ORACLE_DECIMALS,
        }
    }
}

#[async_trait]
impl PriceSource for AaveOracle {
    fn id(&self) -> SourceId {
        SourceId::AaveOracle
    }

    async fn quote(
        &self,
        token: Address,
        block: u64,
        _lookup: &dyn PriceLookup,
    ) -> Result<PriceResult, PriceError> {
        let oracle = self
            .config
            .contract_for(SourceId::AaveOracle, block)
            .ok_or(PriceError::SourceUnavailable { block })?;

        let raw = self.reader.get_asset_price(oracle, token, block).await?;
        if raw.is_zero() {
            return Ok(PriceResult::failure());
        }

        Ok(PriceResult::success(
            math::u256_to_decimal(raw, 0)?,
            self.decimals,
            SourceId::AaveOracle,
        ))
    }
}
