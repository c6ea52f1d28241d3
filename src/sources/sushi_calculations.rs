//! Yearn CalculationsSushiSwap helper: `getPriceUsdc(token)` resolves both
//! plain tokens and SushiSwap LP tokens (6-decimal fixed point).

use async_trait::async_trait;
use ethers::types::Address;
use std::sync::Arc;

use crate::chain::ChainReader;
use crate::config::NetworkConfig;
use crate::errors::PriceError;
use crate::math;
use crate::resolver::{PriceLookup, PriceSource};
use crate::types::{PriceResult, SourceId, USDC_DECIMALS};

pub struct SushiCalculations {
    config: Arc<NetworkConfig>,
    reader: Arc<dyn ChainReader>,
    /// Fixed-point precision of the helper's answers.
    decimals: u8,
}

impl SushiCalculations {
    pub fn new(config: Arc<NetworkConfig>, reader: Arc<dyn ChainReader>) -> Self {
        Self {
            config,
            reader,
            decimals: USDC_DECIMALS,
        }
    }
}

#[async_trait]
impl PriceSource for SushiCalculations {
    fn id(&self) -> SourceId {
        SourceId::SushiCalculations
    }

    async fn quote(
        &self,
        token: Address,
        block: u64,
        _lookup: &dyn PriceLookup,
    ) -> Result<PriceResult, PriceError> {
        let calculations = self
            .config
            .contract_for(SourceId::SushiCalculations, block)
            .ok_or(PriceError::SourceUnavailable { block })?;

        let raw = self.reader.get_price_usdc(calculations, token, block).await?;
        if raw.is_zero() {
            return Ok(PriceResult::failure());
        }

        Ok(PriceResult::success(
            math::u256_to_decimal(raw, 0)?,
            self.decimals,
            SourceId::SushiCalculations,
        ))
    }
}
