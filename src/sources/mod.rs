//! The price sources, one module per external integration.
//!
//! `default_chain` assembles them in the fixed priority order:
//! aggregator-style oracles first, then DEX-calculation oracles, then AMM
//! routers. This ordering must not change without revisiting every
//! downstream consumer.

pub mod aave_oracle;
pub mod chainlink;
pub mod curve_calculations;
pub mod curve_router;
pub mod sushi_calculations;
pub mod uniswap_router;
pub mod yearn_lens;

use std::sync::Arc;

use crate::chain::{ChainReader, DecimalResolver};
use crate::config::NetworkConfig;
use crate::resolver::PriceSource;

pub use aave_oracle::AaveOracle;
pub use chainlink::ChainLinkFeed;
pub use curve_calculations::CurveCalculations;
pub use curve_router::CurveRouter;
pub use sushi_calculations::SushiCalculations;
pub use uniswap_router::UniswapRouter;
pub use yearn_lens::YearnLensOracle;

/// The fixed, hand-ordered fallback chain.
pub fn default_chain(
    config: Arc<NetworkConfig>,
    reader: Arc<dyn ChainReader>,
    decimals: Arc<DecimalResolver>,
) -> Vec<Arc<dyn PriceSource>> {
    vec![
        Arc::new(YearnLensOracle::new(config.clone(), reader.clone())),
        Arc::new(ChainLinkFeed::new(config.clone(), reader.clone())),
        Arc::new(CurveCalculations::new(config.clone(), reader.clone())),
        Arc::new(SushiCalculations::new(config.clone(), reader.clone())),
        Arc::new(AaveOracle::new(config.clone(), reader.clone())),
        Arc::new(CurveRouter::new(
            config.clone(),
            reader.clone(),
            decimals.clone(),
        )),
        Arc::new(UniswapRouter::new(config, reader, decimals)),
    ]
}
