//! Price cache guard: remembers the last successfully resolved price per
//! token and serves it while fresh, sparing the full fallback walk.
//!
//! Failures are never cached; a token that could not be priced is retried
//! on every call. Staleness is judged against the caller-supplied chain
//! timestamp, not wall-clock time, so backfills behave the same as live
//! indexing.

use dashmap::DashMap;
use ethers::types::Address;
use tracing::trace;

use crate::resolver::PriceResolver;
use crate::types::{CachedPrice, PriceResult, SourceId};

/// Default freshness window, in seconds of chain time.
pub const DEFAULT_STALENESS_SECONDS: u64 = 1800;

pub struct PriceCache {
    entries: DashMap<Address, CachedPrice>,
    staleness_seconds: u64,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::with_staleness(DEFAULT_STALENESS_SECONDS)
    }

    pub fn with_staleness(staleness_seconds: u64) -> Self {
        Self {
            entries: DashMap::new(),
            staleness_seconds,
        }
    }

    /// The remembered price for `token`, if it is still fresh at `timestamp`.
    pub fn fresh_entry(&self, token: Address, timestamp: u64) -> Option<CachedPrice> {
        let entry = self.entries.get(&token)?;
        if timestamp.saturating_sub(entry.as_of_timestamp) <= self.staleness_seconds {
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Serve a fresh cached price, or walk the resolver and remember the
    /// result when it succeeds.
    pub async fn get_or_resolve(
        &self,
        resolver: &PriceResolver,
        token: Address,
        block: u64,
        timestamp: u64,
    ) -> PriceResult {
        if let Some(entry) = self.fresh_entry(token, timestamp) {
            trace!(
                "serving cached price for {:?} (resolved at block {})",
                token,
                entry.as_of_block
            );
            return PriceResult::from_normalized(entry.usd_price, SourceId::Cached);
        }

        let result = resolver.resolve_price(token, block).await;
        if result.succeeded() {
            self.entries.insert(
                token,
                CachedPrice {
                    usd_price: result.normalized(),
                    source: result.source(),
                    as_of_block: block,
                    as_of_timestamp: timestamp,
                },
            );
        }
        result
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new()
    }
}
