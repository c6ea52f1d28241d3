//! Curve registry router: values Curve LP tokens directly against the
//! registries, covering pools the CalculationsCurve helper does not know.
//!
//! Stable pools are priced from the registry's virtual price times the price
//! of a preferred underlying coin. Crypto pools (heterogeneous assets) have
//! a meaningless virtual price, so they are valued from first principles:
//! the sum of each pool balance at its recursively resolved price, divided
//! by LP total supply. A pool is classified as crypto when it exposes
//! `price_oracle()` or the indexed `price_oracle(0)` variant.

use async_trait::async_trait;
use ethers::types::Address;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::trace;

use crate::chain::{ChainReader, DecimalResolver};
use crate::config::NetworkConfig;
use crate::errors::PriceError;
use crate::math;
use crate::resolver::{PriceLookup, PriceSource};
use crate::types::{PriceResult, SourceId};

/// The registries report virtual prices in 18-decimal fixed point.
const VIRTUAL_PRICE_DECIMALS: u8 = 18;

/// Registry pools never hold more coins than this.
const MAX_POOL_COINS: u32 = 8;

pub struct CurveRouter {
    config: Arc<NetworkConfig>,
    reader: Arc<dyn ChainReader>,
    decimals: Arc<DecimalResolver>,
}

impl CurveRouter {
    pub fn new(
        config: Arc<NetworkConfig>,
        reader: Arc<dyn ChainReader>,
        decimals: Arc<DecimalResolver>,
    ) -> Self {
        Self {
            config,
            reader,
            decimals,
        }
    }

    /// Probe the registries, newest last, for the pool minting `lp_token`.
    async fn find_pool(
        &self,
        lp_token: Address,
        block: u64,
    ) -> Result<(Address, Address), PriceError> {
        for registry in &self.config.curve_registries {
            let Some(registry_address) = registry.at_block(block) else {
                continue;
            };
            match self
                .reader
                .pool_from_lp_token(registry_address, lp_token, block)
                .await
            {
                Ok(pool) if !pool.is_zero() => return Ok((registry_address, pool)),
                Ok(_) => continue,
                Err(e) => {
                    trace!("registry {:?} lookup for {:?} failed: {}", registry_address, lp_token, e);
                    continue;
                }
            }
        }
        Err(PriceError::SourceUnavailable { block })
    }

    /// Pick the underlying coin whose price anchors the virtual-price path:
    /// the last non-zero entry of the registry's coin list.
    async fn preferred_underlying(
        &self,
        registry: Address,
        pool: Address,
        block: u64,
    ) -> Result<Option<Address>, PriceError> {
        let coins = self.reader.underlying_coins(registry, pool, block).await?;
        let mut preferred = None;
        for coin in coins {
            if coin.is_zero() {
                break;
            }
            preferred = Some(coin);
        }
        Ok(preferred)
    }

    /// Stable pools: lp price = virtual price * price of the anchor coin.
    async fn virtual_price_quote(
        &self,
        registry: Address,
        pool: Address,
        lp_token: Address,
        block: u64,
        lookup: &dyn PriceLookup,
    ) -> Result<PriceResult, PriceError> {
        let virtual_price_raw = self
            .reader
            .virtual_price_from_lp_token(registry, lp_token, block)
            .await?;
        if virtual_price_raw.is_zero() {
            return Ok(PriceResult::failure());
        }
        let virtual_price = math::u256_to_decimal(virtual_price_raw, VIRTUAL_PRICE_DECIMALS)?;

        let Some(anchor) = self.preferred_underlying(registry, pool, block).await? else {
            return Ok(PriceResult::failure());
        };
        let anchor_price = lookup.resolve_price(anchor, block).await;
        if !anchor_price.succeeded() {
            return Err(PriceError::AllSourcesExhausted(anchor));
        }

        Ok(PriceResult::from_normalized(
            virtual_price * anchor_price.normalized(),
            SourceId::CurveRouter,
        ))
    }

    /// Crypto pools: sum the pool's balances at resolved prices and divide
    /// by LP total supply.
    async fn reserves_quote(
        &self,
        pool: Address,
        lp_token: Address,
        block: u64,
        lookup: &dyn PriceLookup,
    ) -> Result<PriceResult, PriceError> {
        let mut total_value = Decimal::ZERO;
        let mut coins_seen = 0u32;

        for index in 0..MAX_POOL_COINS {
            let coin = match self.reader.pool_coin(pool, index, block).await {
                Ok(coin) if !coin.is_zero() => coin,
                _ => break,
            };
            let balance = self.reader.pool_balance(pool, index, block).await?;

            let price = lookup.resolve_price(coin, block).await;
            if !price.succeeded() {
                return Err(PriceError::AllSourcesExhausted(coin));
            }
            let coin_decimals = self
                .decimals
                .decimals_of(self.reader.as_ref(), coin, block, false)
                .await;
            total_value += math::u256_to_decimal(balance, coin_decimals)? * price.normalized();
            coins_seen += 1;
        }

        if coins_seen == 0 {
            return Ok(PriceResult::failure());
        }

        let supply_raw = self.reader.token_total_supply(lp_token, block).await?;
        if supply_raw.is_zero() {
            return Err(PriceError::ZeroDivision("pool token total supply"));
        }
        let lp_decimals = self
            .decimals
            .decimals_of(self.reader.as_ref(), lp_token, block, false)
            .await;
        let supply = math::u256_to_decimal(supply_raw, lp_decimals)?;
        if supply.is_zero() {
            return Err(PriceError::ZeroDivision("pool token total supply"));
        }

        Ok(PriceResult::from_normalized(
            total_value / supply,
            SourceId::CurveRouter,
        ))
    }
}

#[async_trait]
impl PriceSource for CurveRouter {
    fn id(&self) -> SourceId {
        SourceId::CurveRouter
    }

    async fn quote(
        &self,
        token: Address,
        block: u64,
        lookup: &dyn PriceLookup,
    ) -> Result<PriceResult, PriceError> {
        let (registry, pool) = self.find_pool(token, block).await?;

        // only crypto pools expose a price oracle (parameterless on
        // two-asset pools, indexed on multi-asset ones); for them the
        // virtual price does not track USD value
        let is_crypto_pool = self.reader.pool_price_oracle(pool, block).await.is_ok()
            || self
                .reader
                .pool_price_oracle_indexed(pool, block)
                .await
                .is_ok();

        if is_crypto_pool {
            self.reserves_quote(pool, token, block, lookup).await
        } else {
            self.virtual_price_quote(registry, pool, token, block, lookup)
                .await
        }
    }
}
