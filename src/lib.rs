//! USD price resolution for ERC20 tokens at historical blocks.
//!
//! The engine walks a fixed-priority chain of independent price sources
//! (aggregator oracles, DEX calculation helpers, AMM routers) and returns
//! the first successful quote as a fixed-point [`PriceResult`]. Pool/LP
//! tokens are valued recursively from their constituents, guarded against
//! cyclic pool configurations.
//!
//! All external reads go through the [`ChainReader`] trait, so the engine
//! runs identically against a live archive node or a mock in tests.
//!
//! ```no_run
//! use std::sync::Arc;
//! use price_engine::{NetworkConfig, PriceResolver};
//! # async fn example(reader: Arc<dyn price_engine::ChainReader>) -> Result<(), price_engine::PriceError> {
//! let config = Arc::new(NetworkConfig::mainnet());
//! let resolver = PriceResolver::new(config, reader)?;
//! let weth: ethers::types::Address =
//!     "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2".parse().unwrap();
//! let price = resolver.resolve_price(weth, 15_000_000).await;
//! if price.succeeded() {
//!     println!("WETH = ${}", price.normalized());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod chain;
pub mod config;
pub mod errors;
pub mod math;
pub mod resolver;
pub mod sources;
pub mod types;

pub use cache::{PriceCache, DEFAULT_STALENESS_SECONDS};
pub use chain::{CallResult, ChainReader, DecimalResolver};
pub use config::NetworkConfig;
pub use errors::{CallError, PriceError};
pub use resolver::{PriceLookup, PriceResolver, PriceSource, ResolverMetrics, MAX_RECURSION_DEPTH};
pub use types::{
    CachedPrice, ContractDescriptor, PriceResult, SourceId, TokenDescriptor, UnknownPriceFallback,
};
