//! Uniswap-fork routers: swap-quote pricing for plain tokens and
//! reserves-based valuation for pair (LP) tokens.
//!
//! Plain tokens are priced by asking each configured router what one whole
//! token swaps to in USDC, routing through the wrapped-native intermediate
//! unless the token is the wrapped native itself. The quoted output is then
//! grossed back up for the 0.30% fee taken on every hop, so the result
//! approximates a fee-free mid-price.
//!
//! Pair tokens are priced from first principles: each reserve valued at the
//! recursively resolved price of its constituent, divided by total supply.

use async_trait::async_trait;
use ethers::types::{Address, U256};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::trace;

use crate::chain::{ChainReader, DecimalResolver};
use crate::config::NetworkConfig;
use crate::errors::PriceError;
use crate::math;
use crate::resolver::{PriceLookup, PriceSource};
use crate::types::{PriceResult, SourceId};

/// Per-hop swap fee of the V2-style forks, in basis points.
const SWAP_FEE_BIPS: u32 = 30;

pub struct UniswapRouter {
    config: Arc<NetworkConfig>,
    reader: Arc<dyn ChainReader>,
    decimals: Arc<DecimalResolver>,
}

impl UniswapRouter {
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

    /// A token is treated as a pair token when it answers `factory()`.
    /// The wrapped native is exempt: some fork deployments proxy it through
    /// a contract that happens to expose the same selector.
    async fn is_lp_token(&self, token: Address, block: u64) -> bool {
        if let Some(weth) = self.config.wrapped_native() {
            if token == weth.address {
                return false;
            }
        }
        self.reader.pair_factory(token, block).await.is_ok()
    }

    /// Quote one whole token into USDC across the configured routers,
    /// first live answer wins.
    async fn route_to_usdc(
        &self,
        token: Address,
        block: u64,
    ) -> Result<PriceResult, PriceError> {
        let usdc = self
            .config
            .usdc()
            .ok_or_else(|| PriceError::Config("missing USDC entry".to_string()))?;
        let weth = self
            .config
            .wrapped_native()
            .ok_or_else(|| PriceError::Config("missing WETH entry".to_string()))?;

        let path: Vec<Address> = if token == weth.address {
            vec![token, usdc.address]
        } else {
            vec![token, weth.address, usdc.address]
        };
        let hops = (path.len() - 1) as u32;

        let token_decimals = self
            .decimals
            .decimals_of(self.reader.as_ref(), token, block, false)
            .await;
        let amount_in = U256::exp10(token_decimals as usize);

        for router in &self.config.uniswap_routers {
            let Some(router_address) = router.at_block(block) else {
                continue;
            };

            let amounts = match self
                .reader
                .get_amounts_out(router_address, amount_in, &path, block)
                .await
            {
                Ok(amounts) => amounts,
                Err(e) => {
                    trace!("router {:?} quote for {:?} failed: {}", router_address, token, e);
                    continue;
                }
            };

            let Some(amount_out) = amounts.last().copied() else {
                continue;
            };
            if amount_out.is_zero() {
                continue;
            }

            let raw = math::u256_to_decimal(amount_out, 0)?;
            let compensated = math::compensate_swap_fee(raw, SWAP_FEE_BIPS, hops)?;
            return Ok(PriceResult::success(
                compensated,
                usdc.decimals,
                SourceId::UniswapRouter,
            ));
        }

        Ok(PriceResult::failure())
    }

    /// Value a pair token as (reserve0 * price0 + reserve1 * price1) / supply,
    /// resolving constituent prices through the full fallback chain.
    async fn lp_token_price(
        &self,
        pair: Address,
        block: u64,
        lookup: &dyn PriceLookup,
    ) -> Result<PriceResult, PriceError> {
        let (token0, token1) = self.reader.pair_tokens(pair, block).await?;
        let (reserve0, reserve1) = self.reader.pair_reserves(pair, block).await?;
        if reserve0.is_zero() && reserve1.is_zero() {
            return Ok(PriceResult::failure());
        }

        let mut liquidity = Decimal::ZERO;
        for (coin, reserve) in [(token0, reserve0), (token1, reserve1)] {
            let price = lookup.resolve_price(coin, block).await;
            if !price.succeeded() {
                return Err(PriceError::AllSourcesExhausted(coin));
            }
            let coin_decimals = self
                .decimals
                .decimals_of(self.reader.as_ref(), coin, block, false)
                .await;
            liquidity += math::u256_to_decimal(reserve, coin_decimals)? * price.normalized();
        }

        let supply_raw = self.reader.token_total_supply(pair, block).await?;
        if supply_raw.is_zero() {
            return Err(PriceError::ZeroDivision("LP token total supply"));
        }
        // the pair's own scale is never guessed; a revert fails the valuation
        let pair_decimals = self.reader.token_decimals(pair, block).await?;
        let supply = math::u256_to_decimal(supply_raw, pair_decimals)?;
        if supply.is_zero() {
            return Err(PriceError::ZeroDivision("LP token total supply"));
        }

        Ok(PriceResult::from_normalized(
            liquidity / supply,
            SourceId::UniswapRouter,
        ))
    }
}

#[async_trait]
impl PriceSource for UniswapRouter {
    fn id(&self) -> SourceId {
        SourceId::UniswapRouter
    }

    async fn quote(
        &self,
        token: Address,
        block: u64,
        lookup: &dyn PriceLookup,
    ) -> Result<PriceResult, PriceError> {
        if self.config.uniswap_routers.is_empty() {
            return Err(PriceError::SourceUnavailable { block });
        }

        if self.is_lp_token(token, block).await {
            self.lp_token_price(token, block, lookup).await
        } else {
            self.route_to_usdc(token, block).await
        }
    }
}
