//! Per-network configuration: oracle/router contract addresses with
//! activation heights, the whitelisted reference-token table, the
//! stable-coin set, and per-source blacklists.
//!
//! A `NetworkConfig` is constructed once at process start for the detected
//! chain and passed by reference into the resolver and every adapter; no
//! component reads ambient global state. Hosts that keep their network
//! tables in config files can deserialize this type directly instead of
//! using the built-in constructors.

use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::errors::PriceError;
use crate::types::{ContractDescriptor, SourceId, TokenDescriptor};

/// Whitelist keys for the tokens the engine itself routes through.
pub const USDC: &str = "USDC";
pub const USDT: &str = "USDT";
pub const DAI: &str = "DAI";
pub const WETH: &str = "WETH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Chain identity this table was built for (informational).
    pub network: String,

    /// symbol -> descriptor for reference tokens (USDC, WETH, ...).
    pub whitelisted_tokens: HashMap<String, TokenDescriptor>,

    /// Tokens pegged to $1.00 that short-circuit resolution entirely.
    pub stable_coins: HashSet<Address>,

    /// Tokens that must never be queried through a given source.
    pub blacklists: HashMap<SourceId, HashSet<Address>>,

    pub yearn_lens: Option<ContractDescriptor>,
    pub chainlink_registry: Option<ContractDescriptor>,
    pub aave_oracle: Option<ContractDescriptor>,
    pub curve_calculations: Option<ContractDescriptor>,
    pub sushi_calculations: Option<ContractDescriptor>,

    /// Curve registries, newest last; probed in order.
    pub curve_registries: Vec<ContractDescriptor>,

    /// Uniswap-fork routers in priority order.
    pub uniswap_routers: Vec<ContractDescriptor>,
}

impl NetworkConfig {
    /// The single oracle contract backing `source`, if one is configured
    /// and live at `block`.
    pub fn contract_for(&self, source: SourceId, block: u64) -> Option<Address> {
        let descriptor = match source {
            SourceId::YearnLens => self.yearn_lens.as_ref(),
            SourceId::ChainLink => self.chainlink_registry.as_ref(),
            SourceId::AaveOracle => self.aave_oracle.as_ref(),
            SourceId::CurveCalculations => self.curve_calculations.as_ref(),
            SourceId::SushiCalculations => self.sushi_calculations.as_ref(),
            _ => None,
        };
        descriptor.and_then(|d| d.at_block(block))
    }

    pub fn is_blacklisted(&self, source: SourceId, token: Address) -> bool {
        self.blacklists
            .get(&source)
            .map(|set| set.contains(&token))
            .unwrap_or(false)
    }

    pub fn is_stable_coin(&self, token: Address) -> bool {
        self.stable_coins.contains(&token)
    }

    pub fn whitelisted(&self, symbol: &str) -> Option<&TokenDescriptor> {
        self.whitelisted_tokens.get(symbol)
    }

    pub fn usdc(&self) -> Option<&TokenDescriptor> {
        self.whitelisted(USDC)
    }

    /// Wrapped-native intermediate used for multi-hop router paths.
    pub fn wrapped_native(&self) -> Option<&TokenDescriptor> {
        self.whitelisted(WETH)
    }

    /// Reject tables that cannot support the router adapters. Called once
    /// at resolver construction; a failure here is a deployment error.
    pub fn validate(&self) -> Result<(), PriceError> {
        if self.usdc().is_none() {
            return Err(PriceError::Config(format!(
                "network {}: whitelisted_tokens is missing the {} entry",
                self.network, USDC
            )));
        }
        if self.wrapped_native().is_none() {
            return Err(PriceError::Config(format!(
                "network {}: whitelisted_tokens is missing the {} entry",
                self.network, WETH
            )));
        }
        Ok(())
    }

    /// Reference tables for Ethereum mainnet.
    pub fn mainnet() -> Self {
        let whitelisted_tokens = HashMap::from([
            (
                USDC.to_string(),
                TokenDescriptor::new(USDC, 6, addr("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48")),
            ),
            (
                USDT.to_string(),
                TokenDescriptor::new(USDT, 6, addr("0xdac17f958d2ee523a2206206994597c13d831ec7")),
            ),
            (
                DAI.to_string(),
                TokenDescriptor::new(DAI, 18, addr("0x6b175474e89094c44da98b954eedeac495271d0f")),
            ),
            (
                WETH.to_string(),
                TokenDescriptor::new(WETH, 18, addr("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2")),
            ),
        ]);

        let stable_coins = HashSet::from([
            addr("0x6b175474e89094c44da98b954eedeac495271d0f"), // DAI
            addr("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"), // USDC
            addr("0xdac17f958d2ee523a2206206994597c13d831ec7"), // Tether USD
            addr("0x6c3f90f043a72fa612cbac8115ee7e52bde6e490"), // Curve.fi DAI/USDC/USDT
            addr("0x853d955acef822db058eb8505911ed77f175b99e"), // FRAX
            addr("0xd632f22692fac7611d2aa1c0d552930d43caed3b"), // Curve.fi FRAX metapool
            addr("0x99d8a9c45b2eca8864373a26d1459e3dff1e17f3"), // Magic Internet Money
            addr("0x5a6a4d54456819380173272a5e8e9b9904bdf41b"), // Curve.fi MIM 3Pool
            addr("0xbc6da0fe9ad5f3b0d58160288917aa56653660e9"), // Alchemix USD
            addr("0x43b4fdfd4ff969587185cdb6f0bd875c5fc83f8c"), // Curve.fi alUSD metapool
            addr("0x57ab1ec28d129707052df4df418d58a2d46d5f51"), // Synth sUSD
            addr("0xc25a3a3b969415c80451098fa907ec722572917f"), // Curve.fi DAI/USDC/USDT/sUSD
            addr("0x0000000000085d4780b73119b644ae5ecd22b376"), // TrueUSD
            addr("0xecd5e75afb02efa118af914515d6521aabd189f1"), // Curve.fi TrueUSD metapool
            addr("0x3175df0976dfa876431c2e9ee6bc45b65d3473cc"), // Curve.fi FRAX/USDC
            addr("0x4fabb145d64652a948d72533023f6e7a623c7c53"), // Binance USD
            addr("0x956f47f50a910163d8bf957cf5846d573e7f87ca"), // Fei USD
            addr("0x056fd409e1d7a124bd7017459dfea2f387b6d5cd"), // gUSD
            addr("0x5f98805a4e8be255a32880fdec7f6728c6568ba0"), // LUSD
        ]);

        let blacklists = HashMap::from([
            (
                SourceId::YearnLens,
                HashSet::from([
                    addr("0x5f98805a4e8be255a32880fdec7f6728c6568ba0"), // LUSD
                    addr("0x8daebade922df735c38c80c7ebd708af50815faa"), // tBTC
                    addr("0x0316eb71485b0ab14103307bf65a021042c6d380"), // Huobi BTC
                    addr("0xca3d75ac011bf5ad07a98d02f18225f9bd9a6bdf"), // crvTriCrypto
                    addr("0xae7ab96520de3a18e5e111b5eaab095312d7fe84"), // stETH
                    addr("0x7f86bf177dd4f3494b841a37e810a34dd56c829b"), // TricryptoUSDC
                    addr("0xf5f5b97624542d72a9e06f04804bf81baa15e2b4"), // TricryptoUSDT
                ]),
            ),
            (
                SourceId::CurveCalculations,
                HashSet::from([
                    addr("0xca3d75ac011bf5ad07a98d02f18225f9bd9a6bdf"), // crvTriCrypto
                    addr("0xc4ad29ba4b3c580e6d59105fff484999997675ff"), // crv3Crypto
                ]),
            ),
        ]);

        Self {
            network: "mainnet".to_string(),
            whitelisted_tokens,
            stable_coins,
            blacklists,
            yearn_lens: Some(ContractDescriptor::new(
                addr("0x83d95e0d5f402511db06817aff3f9ea88224b030"),
                12_242_339,
            )),
            chainlink_registry: Some(ContractDescriptor::new(
                addr("0x47fb2585d2c56fe188d0e6ec628a38b74fceeedf"),
                12_864_088,
            )),
            // Not deployed on mainnet; active on Aave L2 networks.
            aave_oracle: None,
            curve_calculations: Some(ContractDescriptor::new(
                addr("0x25bf7b72815476dd515044f9650bf79bad0df655"),
                12_370_088,
            )),
            sushi_calculations: Some(ContractDescriptor::new(
                addr("0x5ea7e501c9a23f4a76dc7d33a11d995b13a1dd25"),
                2_396_120,
            )),
            curve_registries: vec![
                ContractDescriptor::new(
                    addr("0x7d86446ddb609ed0f5f8684acf30380a356b2b4c"),
                    11_154_794,
                ),
                ContractDescriptor::new(
                    addr("0x8f942c20d02befc377d41445793068908e2250d0"),
                    13_986_752,
                ),
            ],
            uniswap_routers: vec![
                // Uniswap V2
                ContractDescriptor::new(
                    addr("0x7a250d5630b4cf539739df2c5dacb4c659f2488d"),
                    10_207_858,
                ),
                // SushiSwap
                ContractDescriptor::new(
                    addr("0xd9e1ce17f2641f24ae83637ab66a2cca9c378b9f"),
                    10_794_261,
                ),
            ],
        }
    }
}

/// Parse a well-known address literal from the deployment tables.
fn addr(s: &str) -> Address {
    s.parse().expect("valid address literal in network table")
}
