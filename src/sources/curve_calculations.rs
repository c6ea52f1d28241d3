//! Yearn CalculationsCurve helper: `getCurvePriceUsdc(lpToken)` for Curve
//! LP tokens the helper recognizes (6-decimal fixed point).

use async_trait::async_trait;
use ethers::types::Address;
use std::sync::Arc;

use crate::chain::ChainReader;
use crate::config::NetworkConfig;
use crate::errors::PriceError;
use crate::math;
use crate::resolver::{PriceLookup, PriceSource};
use crate::types::{PriceResult, SourceId, USDC_DECIMALS};

pub struct CurveCalculations {
    config: Arc<NetworkConfig>,
    reader: Arc<dyn ChainReader>,
    /// Fixed-point precision of the helper's answers.
    decimals: u8,
}

impl CurveCalculations {
    pub fn new(config: Arc<NetworkConfig>, reader: Arc<dyn ChainReader>) -> Self {
        Self {
            config,
            reader,
            decimals: USDC_DECIMALS,
        }
    }
}

#[async_trait]
impl PriceSource for CurveCalculations {
    fn id(&self) -> SourceId {
        SourceId::CurveCalculations
    }

    async fn quote(
        &self,
        token: Address,
        block: u64,
        _lookup: &dyn PriceLookup,
    ) -> Result<PriceResult, PriceError> {
        let calculations = self
            .config
            .contract_for(SourceId::CurveCalculations, block)
            .ok_or(PriceError::SourceUnavailable { block })?;

        let raw = self
            .reader
            .get_curve_price_usdc(calculations, token, block)
            .await?;
        if raw.is_zero() {
            return Ok(PriceResult::failure());
        }

        Ok(PriceResult::success(
            math::u256_to_decimal(raw, 0)?,
            self.decimals,
            SourceId::CurveCalculations,
        ))
    }
}
