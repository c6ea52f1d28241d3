//! ChainLink feed registry: `latestRoundData(token, USD)` plus an auxiliary
//! `decimals(token, USD)` call, since feed precision varies per pair.

use async_trait::async_trait;
use ethers::types::Address;
use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::chain::ChainReader;
use crate::config::NetworkConfig;
use crate::errors::PriceError;
use crate::math;
use crate::resolver::{PriceLookup, PriceSource};
use crate::types::{PriceResult, SourceId};

/// The registry's synthetic denomination address for USD quotes.
static USD_DENOMINATION: Lazy<Address> = Lazy::new(|| {
    "0x0000000000000000000000000000000000000348"
        .parse()
        .expect("valid denomination literal")
});

/// Precision assumed when the registry's `decimals` call itself reverts.
/// USD feeds answer in 8 decimals unless stated otherwise.
const DEFAULT_FEED_DECIMALS: u8 = 8;

pub struct ChainLinkFeed {
    config: Arc<NetworkConfig>,
    reader: Arc<dyn ChainReader>,
}

impl ChainLinkFeed {
    pub fn new(config: Arc<NetworkConfig>, reader: Arc<dyn ChainReader>) -> Self {
        Self { config, reader }
    }
}

#[async_trait]
impl PriceSource for ChainLinkFeed {
    fn id(&self) -> SourceId {
        SourceId::ChainLink
    }

    async fn quote(
        &self,
        token: Address,
        block: u64,
        _lookup: &dyn PriceLookup,
    ) -> Result<PriceResult, PriceError> {
        let registry = self
            .config
            .contract_for(SourceId::ChainLink, block)
            .ok_or(PriceError::SourceUnavailable { block })?;

        let answer = self
            .reader
            .latest_round_data(registry, token, *USD_DENOMINATION, block)
            .await?;
        if answer.is_zero() {
            return Ok(PriceResult::failure());
        }

        let feed_decimals = self
            .reader
            .feed_decimals(registry, token, *USD_DENOMINATION, block)
            .await
            .unwrap_or(DEFAULT_FEED_DECIMALS);

        Ok(PriceResult::success(
            math::u256_to_decimal(answer, 0)?,
            feed_decimals,
            SourceId::ChainLink,
        ))
    }
}
