use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::{Address, U256};

use price_engine::chain::CallResult;
use price_engine::errors::CallError;
use price_engine::types::{ContractDescriptor, SourceId, TokenDescriptor};
use price_engine::{ChainReader, NetworkConfig};

// === Well-known test addresses ===

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub const USDC_ADDR: u8 = 0x01;
pub const WETH_ADDR: u8 = 0x02;
pub const YEARN_LENS_ADDR: u8 = 0x10;
pub const CHAINLINK_ADDR: u8 = 0x11;
pub const CURVE_CALC_ADDR: u8 = 0x12;
pub const SUSHI_CALC_ADDR: u8 = 0x13;
pub const CURVE_REGISTRY_ADDR: u8 = 0x14;
pub const UNI_ROUTER_ADDR: u8 = 0x15;

/// A synthetic network with every source live from block 0 and no
/// blacklists. Tests mutate the returned value when they need gating or
/// blacklist behavior.
pub fn test_config() -> NetworkConfig {
    let mut config = NetworkConfig::default();
    config.network = "test".to_string();
    config.whitelisted_tokens = HashMap::from([
        (
            "USDC".to_string(),
            TokenDescriptor::new("USDC", 6, addr(USDC_ADDR)),
        ),
        (
            "WETH".to_string(),
            TokenDescriptor::new("WETH", 18, addr(WETH_ADDR)),
        ),
    ]);
    config.yearn_lens = Some(ContractDescriptor::new(addr(YEARN_LENS_ADDR), 0));
    config.chainlink_registry = Some(ContractDescriptor::new(addr(CHAINLINK_ADDR), 0));
    config.curve_calculations = Some(ContractDescriptor::new(addr(CURVE_CALC_ADDR), 0));
    config.sushi_calculations = Some(ContractDescriptor::new(addr(SUSHI_CALC_ADDR), 0));
    config.curve_registries = vec![ContractDescriptor::new(addr(CURVE_REGISTRY_ADDR), 0)];
    config.uniswap_routers = vec![ContractDescriptor::new(addr(UNI_ROUTER_ADDR), 0)];
    config
}

pub fn blacklist(config: &mut NetworkConfig, source: SourceId, token: Address) {
    config
        .blacklists
        .entry(source)
        .or_insert_with(HashSet::new)
        .insert(token);
}

// === Mock ChainReader ===

/// Programmable chain: every read answers from a fixture map, anything not
/// programmed reverts. Counters record how many times each oracle read was
/// actually performed, which is what the skip/blacklist tests observe.
#[derive(Default)]
pub struct MockChainReader {
    pub yearn_prices: HashMap<Address, U256>,
    pub chainlink_answers: HashMap<Address, U256>,
    pub chainlink_decimals: HashMap<Address, u8>,
    pub curve_calc_prices: HashMap<Address, U256>,
    pub sushi_prices: HashMap<Address, U256>,
    pub aave_prices: HashMap<Address, U256>,

    /// (router, path head) -> full getAmountsOut answer.
    pub amounts_out: HashMap<(Address, Address), Vec<U256>>,
    pub pair_factories: HashMap<Address, Address>,
    pub pair_tokens: HashMap<Address, (Address, Address)>,
    pub pair_reserves: HashMap<Address, (U256, U256)>,

    pub pools_by_lp: HashMap<(Address, Address), Address>,
    pub virtual_prices: HashMap<Address, U256>,
    pub underlying_coins: HashMap<Address, Vec<Address>>,
    pub price_oracles: HashMap<Address, U256>,
    pub indexed_price_oracles: HashMap<Address, U256>,
    pub pool_coins: HashMap<(Address, u32), Address>,
    pub pool_balances: HashMap<(Address, u32), U256>,

    pub decimals: HashMap<Address, u8>,
    pub total_supplies: HashMap<Address, U256>,
    pub names: HashMap<Address, String>,

    pub yearn_calls: AtomicU64,
    pub chainlink_calls: AtomicU64,
    pub curve_calc_calls: AtomicU64,
    pub sushi_calls: AtomicU64,
    pub aave_calls: AtomicU64,
    pub router_calls: AtomicU64,
}

impl MockChainReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_yearn_price(mut self, token: Address, raw: u64) -> Self {
        self.yearn_prices.insert(token, U256::from(raw));
        self
    }

    pub fn with_chainlink_answer(mut self, token: Address, raw: u64, decimals: u8) -> Self {
        self.chainlink_answers.insert(token, U256::from(raw));
        self.chainlink_decimals.insert(token, decimals);
        self
    }

    pub fn with_sushi_price(mut self, token: Address, raw: u64) -> Self {
        self.sushi_prices.insert(token, U256::from(raw));
        self
    }

    pub fn with_amounts_out(mut self, router: Address, head: Address, amounts: Vec<U256>) -> Self {
        self.amounts_out.insert((router, head), amounts);
        self
    }

    pub fn with_pair(
        mut self,
        pair: Address,
        token0: Address,
        token1: Address,
        reserve0: U256,
        reserve1: U256,
        total_supply: U256,
    ) -> Self {
        self.pair_factories.insert(pair, addr(0xfa));
        self.pair_tokens.insert(pair, (token0, token1));
        self.pair_reserves.insert(pair, (reserve0, reserve1));
        self.total_supplies.insert(pair, total_supply);
        self
    }

    pub fn with_decimals(mut self, token: Address, decimals: u8) -> Self {
        self.decimals.insert(token, decimals);
        self
    }

    fn lookup<K: std::hash::Hash + Eq, V: Clone>(
        map: &HashMap<K, V>,
        key: &K,
        what: &str,
    ) -> CallResult<V> {
        map.get(key)
            .cloned()
            .ok_or_else(|| CallError::reverted(what))
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn get_price_usdc_recommended(
        &self,
        _oracle: Address,
        token: Address,
        _block: u64,
    ) -> CallResult<U256> {
        self.yearn_calls.fetch_add(1, Ordering::SeqCst);
        Self::lookup(&self.yearn_prices, &token, "getPriceUsdcRecommended")
    }

    async fn get_asset_price(
        &self,
        _oracle: Address,
        asset: Address,
        _block: u64,
    ) -> CallResult<U256> {
        self.aave_calls.fetch_add(1, Ordering::SeqCst);
        Self::lookup(&self.aave_prices, &asset, "getAssetPrice")
    }

    async fn latest_round_data(
        &self,
        _registry: Address,
        base: Address,
        _quote: Address,
        _block: u64,
    ) -> CallResult<U256> {
        self.chainlink_calls.fetch_add(1, Ordering::SeqCst);
        Self::lookup(&self.chainlink_answers, &base, "latestRoundData")
    }

    async fn feed_decimals(
        &self,
        _registry: Address,
        base: Address,
        _quote: Address,
        _block: u64,
    ) -> CallResult<u8> {
        Self::lookup(&self.chainlink_decimals, &base, "decimals")
    }

    async fn get_curve_price_usdc(
        &self,
        _calculations: Address,
        token: Address,
        _block: u64,
    ) -> CallResult<U256> {
        self.curve_calc_calls.fetch_add(1, Ordering::SeqCst);
        Self::lookup(&self.curve_calc_prices, &token, "getCurvePriceUsdc")
    }

    async fn get_price_usdc(
        &self,
        _calculations: Address,
        token: Address,
        _block: u64,
    ) -> CallResult<U256> {
        self.sushi_calls.fetch_add(1, Ordering::SeqCst);
        Self::lookup(&self.sushi_prices, &token, "getPriceUsdc")
    }

    async fn get_amounts_out(
        &self,
        router: Address,
        _amount_in: U256,
        path: &[Address],
        _block: u64,
    ) -> CallResult<Vec<U256>> {
        self.router_calls.fetch_add(1, Ordering::SeqCst);
        let head = path.first().copied().unwrap_or_default();
        Self::lookup(&self.amounts_out, &(router, head), "getAmountsOut")
    }

    async fn pair_factory(&self, pair: Address, _block: u64) -> CallResult<Address> {
        Self::lookup(&self.pair_factories, &pair, "factory")
    }

    async fn pair_tokens(&self, pair: Address, _block: u64) -> CallResult<(Address, Address)> {
        Self::lookup(&self.pair_tokens, &pair, "token0/token1")
    }

    async fn pair_reserves(&self, pair: Address, _block: u64) -> CallResult<(U256, U256)> {
        Self::lookup(&self.pair_reserves, &pair, "getReserves")
    }

    async fn pool_from_lp_token(
        &self,
        registry: Address,
        lp_token: Address,
        _block: u64,
    ) -> CallResult<Address> {
        Self::lookup(
            &self.pools_by_lp,
            &(registry, lp_token),
            "get_pool_from_lp_token",
        )
    }

    async fn virtual_price_from_lp_token(
        &self,
        _registry: Address,
        lp_token: Address,
        _block: u64,
    ) -> CallResult<U256> {
        Self::lookup(
            &self.virtual_prices,
            &lp_token,
            "get_virtual_price_from_lp_token",
        )
    }

    async fn underlying_coins(
        &self,
        _registry: Address,
        pool: Address,
        _block: u64,
    ) -> CallResult<Vec<Address>> {
        Self::lookup(&self.underlying_coins, &pool, "get_underlying_coins")
    }

    async fn pool_price_oracle(&self, pool: Address, _block: u64) -> CallResult<U256> {
        Self::lookup(&self.price_oracles, &pool, "price_oracle")
    }

    async fn pool_price_oracle_indexed(&self, pool: Address, _block: u64) -> CallResult<U256> {
        Self::lookup(&self.indexed_price_oracles, &pool, "price_oracle(0)")
    }

    async fn pool_coin(&self, pool: Address, index: u32, _block: u64) -> CallResult<Address> {
        Self::lookup(&self.pool_coins, &(pool, index), "coins")
    }

    async fn pool_balance(&self, pool: Address, index: u32, _block: u64) -> CallResult<U256> {
        Self::lookup(&self.pool_balances, &(pool, index), "balances")
    }

    async fn token_decimals(&self, token: Address, _block: u64) -> CallResult<u8> {
        Self::lookup(&self.decimals, &token, "decimals")
    }

    async fn token_total_supply(&self, token: Address, _block: u64) -> CallResult<U256> {
        Self::lookup(&self.total_supplies, &token, "totalSupply")
    }

    async fn token_name(&self, token: Address, _block: u64) -> CallResult<String> {
        Self::lookup(&self.names, &token, "name")
    }
}

/// Build a resolver over the given fixture chain with the default test
/// config.
pub fn resolver_with(
    reader: Arc<MockChainReader>,
    config: NetworkConfig,
) -> price_engine::PriceResolver {
    price_engine::PriceResolver::new(Arc::new(config), reader).expect("test config validates")
}
