//! Core value types shared by the resolver, the adapters, and the cache.

use ethers::types::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::math;

/// Reference decimals for USD-denominated results (USDC fixed point).
pub const USDC_DECIMALS: u8 = 6;

/// Default number of decimals for ERC20 tokens when not retrievable.
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Identity of a price source in the fallback chain.
///
/// The ordering of the chain itself lives in the resolver; this enum only
/// names the sources so blacklists, skip sets, and results can refer to
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceId {
    /// No source: the failure value.
    None,
    /// Token was found in the network's stable-coin set; price pegged to $1.
    HardcodedStable,
    /// A previously resolved price served from the cache guard.
    Cached,
    YearnLens,
    ChainLink,
    CurveCalculations,
    SushiCalculations,
    AaveOracle,
    CurveRouter,
    UniswapRouter,
}

impl SourceId {
    /// Short tag used in log lines, mirroring the bracketed source names
    /// the surrounding handlers grep for.
    pub fn tag(&self) -> &'static str {
        match self {
            SourceId::None => "None",
            SourceId::HardcodedStable => "HardcodedStable",
            SourceId::Cached => "Cached",
            SourceId::YearnLens => "YearnLens",
            SourceId::ChainLink => "ChainLink",
            SourceId::CurveCalculations => "CalculationsCurve",
            SourceId::SushiCalculations => "CalculationsSushiSwap",
            SourceId::AaveOracle => "AaveOracle",
            SourceId::CurveRouter => "CurveRouter",
            SourceId::UniswapRouter => "UniswapRouter",
        }
    }
}

/// Outcome of one price resolution attempt. Immutable once constructed.
///
/// `usd_price` is a fixed-point value scaled by `decimal_base` (always a
/// positive power of ten); `normalized()` yields the human-readable USD
/// price. A result with `succeeded == false` must never be used
/// arithmetically — callers branch on `succeeded` first.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceResult {
    usd_price: Decimal,
    decimal_base: Decimal,
    succeeded: bool,
    source: SourceId,
}

impl PriceResult {
    /// The failure value: `{0, 1, false, None}`.
    pub fn failure() -> Self {
        Self {
            usd_price: Decimal::ZERO,
            decimal_base: Decimal::ONE,
            succeeded: false,
            source: SourceId::None,
        }
    }

    /// A successful quote of `raw_price` expressed in `10^decimals` fixed
    /// point.
    pub fn success(raw_price: Decimal, decimals: u8, source: SourceId) -> Self {
        Self {
            usd_price: raw_price,
            decimal_base: math::exponent_to_decimal(decimals),
            succeeded: true,
            source,
        }
    }

    /// A successful quote from an already human-normalized USD price,
    /// re-scaled into the default USDC base.
    pub fn from_normalized(price: Decimal, source: SourceId) -> Self {
        Self::success(
            price * math::exponent_to_decimal(USDC_DECIMALS),
            USDC_DECIMALS,
            source,
        )
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    /// Raw fixed-point price. Divide by `decimal_base()` before use.
    pub fn usd_price(&self) -> Decimal {
        self.usd_price
    }

    /// The power-of-ten scale of `usd_price()`.
    pub fn decimal_base(&self) -> Decimal {
        self.decimal_base
    }

    /// Human-readable USD price. Zero for the failure value.
    pub fn normalized(&self) -> Decimal {
        math::safe_div(self.usd_price, self.decimal_base)
    }
}

/// A known token in the network configuration: whitelisted reference tokens
/// and stable coins are described this way so routers can build paths and
/// normalize quotes without an extra on-chain decimals read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub symbol: String,
    pub decimals: u8,
    pub address: Address,
}

impl TokenDescriptor {
    pub fn new(symbol: &str, decimals: u8, address: Address) -> Self {
        Self {
            symbol: symbol.to_string(),
            decimals,
            address,
        }
    }
}

/// An oracle/router contract together with the block height it was deployed
/// or registered at. A source bound to this descriptor is inert (treated as
/// "no such source") for any query below `active_from_block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDescriptor {
    pub address: Address,
    pub active_from_block: u64,
}

impl ContractDescriptor {
    pub fn new(address: Address, active_from_block: u64) -> Self {
        Self {
            address,
            active_from_block,
        }
    }

    /// The contract address if it is live at `block`.
    pub fn at_block(&self, block: u64) -> Option<Address> {
        (block >= self.active_from_block).then_some(self.address)
    }
}

/// Policy applied by `price_of` when resolution fails.
///
/// Several consumers record $0 for tokens they cannot price; naming the
/// policy keeps that degradation visible and testable instead of burying
/// it inside the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownPriceFallback {
    /// Treat an unknown price as zero value. Degraded but non-fatal.
    #[default]
    Zero,
}

impl UnknownPriceFallback {
    pub fn value_for_unknown(&self) -> Decimal {
        match self {
            UnknownPriceFallback::Zero => Decimal::ZERO,
        }
    }
}

/// The last successfully resolved price of a token, as remembered by the
/// cache guard. Only the guard mutates this; adapters never touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedPrice {
    pub usd_price: Decimal,
    pub source: SourceId,
    pub as_of_block: u64,
    pub as_of_timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn failure_value_is_inert() {
        let r = PriceResult::failure();
        assert!(!r.succeeded());
        assert_eq!(r.usd_price(), Decimal::ZERO);
        assert_eq!(r.decimal_base(), Decimal::ONE);
        assert_eq!(r.normalized(), Decimal::ZERO);
        assert_eq!(r.source(), SourceId::None);
    }

    #[test]
    fn success_scales_by_decimal_base() {
        // 1.5 USD in 6-decimal fixed point
        let r = PriceResult::success(dec!(1_500_000), 6, SourceId::YearnLens);
        assert!(r.succeeded());
        assert_eq!(r.decimal_base(), dec!(1_000_000));
        assert_eq!(r.normalized(), dec!(1.5));
    }

    #[test]
    fn from_normalized_round_trips() {
        let r = PriceResult::from_normalized(dec!(25.00), SourceId::UniswapRouter);
        assert_eq!(r.normalized(), dec!(25.00));
        assert_eq!(r.decimal_base(), dec!(1_000_000));
    }

    #[test]
    fn contract_descriptor_activation_gating() {
        let c = ContractDescriptor::new(Address::repeat_byte(0xaa), 100);
        assert_eq!(c.at_block(99), None);
        assert_eq!(c.at_block(100), Some(Address::repeat_byte(0xaa)));
    }
}
