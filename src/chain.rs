//! The engine's external boundary: read-only smart-contract calls.
//!
//! Every adapter performs its reads through a shared `Arc<dyn ChainReader>`
//! so the whole engine can be driven by a live RPC client, an archive-node
//! snapshot, or a mock in tests. All methods take the query block and are
//! pure functions of `(contract, arguments, block)` — identical inputs at
//! the same block always yield identical outputs, which is what makes the
//! decimals cache and the price cache safe.

use async_trait::async_trait;
use ethers::types::{Address, U256};
use moka::future::Cache;
use std::time::Duration;

use crate::errors::CallError;
use crate::types::{DEFAULT_TOKEN_DECIMALS, USDC_DECIMALS};

pub type CallResult<T> = Result<T, CallError>;

/// Read-only contract call signatures the price sources depend on.
///
/// A reverting call, a missing function, or an absent contract all surface
/// as `CallError::Reverted`; the engine treats them identically.
#[async_trait]
pub trait ChainReader: Send + Sync {
    // --- oracle reads -----------------------------------------------------

    /// YearnLens `getPriceUsdcRecommended(token)` (6-decimal fixed point).
    async fn get_price_usdc_recommended(
        &self,
        oracle: Address,
        token: Address,
        block: u64,
    ) -> CallResult<U256>;

    /// Aave-style `getAssetPrice(asset)` (8-decimal fixed point).
    async fn get_asset_price(
        &self,
        oracle: Address,
        asset: Address,
        block: u64,
    ) -> CallResult<U256>;

    /// ChainLink feed registry `latestRoundData(base, quote)`, reduced to
    /// the round's answer.
    async fn latest_round_data(
        &self,
        registry: Address,
        base: Address,
        quote: Address,
        block: u64,
    ) -> CallResult<U256>;

    /// ChainLink feed registry `decimals(base, quote)`.
    async fn feed_decimals(
        &self,
        registry: Address,
        base: Address,
        quote: Address,
        block: u64,
    ) -> CallResult<u8>;

    /// CalculationsCurve `getCurvePriceUsdc(lpToken)`.
    async fn get_curve_price_usdc(
        &self,
        calculations: Address,
        token: Address,
        block: u64,
    ) -> CallResult<U256>;

    /// CalculationsSushiSwap `getPriceUsdc(token)`.
    async fn get_price_usdc(
        &self,
        calculations: Address,
        token: Address,
        block: u64,
    ) -> CallResult<U256>;

    // --- AMM router / pair reads -----------------------------------------

    /// Router `getAmountsOut(amountIn, path)`.
    async fn get_amounts_out(
        &self,
        router: Address,
        amount_in: U256,
        path: &[Address],
        block: u64,
    ) -> CallResult<Vec<U256>>;

    /// Pair `factory()`. Reverts on anything that is not an LP token.
    async fn pair_factory(&self, pair: Address, block: u64) -> CallResult<Address>;

    /// Pair `token0()` and `token1()`.
    async fn pair_tokens(&self, pair: Address, block: u64) -> CallResult<(Address, Address)>;

    /// Pair `getReserves()`, reduced to the two reserve amounts.
    async fn pair_reserves(&self, pair: Address, block: u64) -> CallResult<(U256, U256)>;

    // --- Curve registry / pool reads --------------------------------------

    /// Registry `get_pool_from_lp_token(lp)`. Zero address when unknown.
    async fn pool_from_lp_token(
        &self,
        registry: Address,
        lp_token: Address,
        block: u64,
    ) -> CallResult<Address>;

    /// Registry `get_virtual_price_from_lp_token(lp)` (18-decimal).
    async fn virtual_price_from_lp_token(
        &self,
        registry: Address,
        lp_token: Address,
        block: u64,
    ) -> CallResult<U256>;

    /// Registry `get_underlying_coins(pool)`; zero-address padded.
    async fn underlying_coins(
        &self,
        registry: Address,
        pool: Address,
        block: u64,
    ) -> CallResult<Vec<Address>>;

    /// Pool `price_oracle()`. Only crypto pools expose it; a revert marks
    /// a stable pool.
    async fn pool_price_oracle(&self, pool: Address, block: u64) -> CallResult<U256>;

    /// Pool `price_oracle(0)`, the indexed variant exposed by multi-asset
    /// crypto pools instead of the parameterless one.
    async fn pool_price_oracle_indexed(&self, pool: Address, block: u64) -> CallResult<U256>;

    /// Pool `coins(i)`.
    async fn pool_coin(&self, pool: Address, index: u32, block: u64) -> CallResult<Address>;

    /// Pool `balances(i)`.
    async fn pool_balance(&self, pool: Address, index: u32, block: u64) -> CallResult<U256>;

    // --- ERC20 reads ------------------------------------------------------

    async fn token_decimals(&self, token: Address, block: u64) -> CallResult<u8>;

    async fn token_total_supply(&self, token: Address, block: u64) -> CallResult<U256>;

    /// Token `name()`, used only for diagnostics when every source fails.
    async fn token_name(&self, token: Address, block: u64) -> CallResult<String>;
}

/// Centralized decimals resolution with a fallback instead of an error:
/// tokens whose `decimals()` reverts are assumed to use 18 decimals (6 for
/// addresses the caller knows to be stables). Decimals are immutable for
/// deployed tokens, so caching across blocks is sound.
pub struct DecimalResolver {
    cache: Cache<Address, u8>,
}

impl DecimalResolver {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .time_to_live(Duration::from_secs(3600))
                .max_capacity(10_000)
                .build(),
        }
    }

    pub async fn decimals_of(
        &self,
        reader: &dyn ChainReader,
        token: Address,
        block: u64,
        known_stable: bool,
    ) -> u8 {
        if let Some(decimals) = self.cache.get(&token).await {
            return decimals;
        }

        let decimals = match reader.token_decimals(token, block).await {
            // no deployed token exceeds 77 decimals; larger values are junk
            Ok(d) if d <= 77 => d,
            _ if known_stable => USDC_DECIMALS,
            _ => DEFAULT_TOKEN_DECIMALS,
        };

        self.cache.insert(token, decimals).await;
        decimals
    }
}

impl Default for DecimalResolver {
    fn default() -> Self {
        Self::new()
    }
}
