//! The price resolver: an ordered fallback walk over independent price
//! sources, first success wins.
//!
//! The source order is a fixed policy decision (aggregator oracles, then
//! DEX-calculation oracles, then AMM routers). Downstream financial
//! aggregates are sensitive to which source wins for a given token, so
//! reordering is a breaking change.

use async_trait::async_trait;
use dashmap::DashMap;
use ethers::types::Address;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::chain::{ChainReader, DecimalResolver};
use crate::config::NetworkConfig;
use crate::errors::PriceError;
use crate::math;
use crate::sources;
use crate::types::{PriceResult, SourceId, UnknownPriceFallback, USDC_DECIMALS};

/// Maximum depth of nested pool-token valuations before the resolver fails
/// closed. A pathological pool configuration could otherwise recurse
/// forever.
pub const MAX_RECURSION_DEPTH: usize = 4;

/// Recursive price lookup capability handed to sources that value a token
/// from constituent prices (LP/pool tokens). Implemented by `PriceResolver`.
#[async_trait]
pub trait PriceLookup: Send + Sync {
    async fn resolve_price(&self, token: Address, block: u64) -> PriceResult;
}

/// One entry in the fallback chain.
///
/// `quote` performs this source's external read(s) and normalizes the
/// result. Errors are never fatal: they disqualify this one source for this
/// one query and the resolver moves on.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn id(&self) -> SourceId;

    async fn quote(
        &self,
        token: Address,
        block: u64,
        lookup: &dyn PriceLookup,
    ) -> Result<PriceResult, PriceError>;
}

/// Guards against cyclic or runaway recursion during pool-token valuation.
/// Tracks the set of tokens currently being resolved; re-entering one, or
/// nesting deeper than `MAX_RECURSION_DEPTH`, is refused.
pub(crate) struct RecursionGuard {
    active_tokens: Mutex<HashSet<Address>>,
}

impl RecursionGuard {
    fn new() -> Self {
        Self {
            active_tokens: Mutex::new(HashSet::new()),
        }
    }

    fn enter(&self, token: Address) -> Result<RecursionGuardToken<'_>, PriceError> {
        let mut active = self.active_tokens.lock();
        if active.len() >= MAX_RECURSION_DEPTH {
            return Err(PriceError::RecursionLimit(token));
        }
        if !active.insert(token) {
            return Err(PriceError::RecursionLimit(token));
        }
        Ok(RecursionGuardToken { token, guard: self })
    }
}

struct RecursionGuardToken<'a> {
    token: Address,
    guard: &'a RecursionGuard,
}

impl Drop for RecursionGuardToken<'_> {
    fn drop(&mut self) {
        self.guard.active_tokens.lock().remove(&self.token);
    }
}

/// Per-source invocation counters. A source skipped by a blacklist or a
/// caller's skip set is never counted, which is what the fallback-order
/// tests observe.
#[derive(Debug, Default)]
pub struct ResolverMetrics {
    invocations: DashMap<SourceId, u64>,
    resolved: AtomicU64,
    exhausted: AtomicU64,
}

impl ResolverMetrics {
    fn record_invocation(&self, source: SourceId) {
        *self.invocations.entry(source).or_insert(0) += 1;
    }

    fn record_resolved(&self) {
        self.resolved.fetch_add(1, Ordering::Relaxed);
    }

    fn record_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    /// How many times a source's `quote` has been invoked.
    pub fn invocations(&self, source: SourceId) -> u64 {
        self.invocations.get(&source).map(|v| *v).unwrap_or(0)
    }

    pub fn resolved(&self) -> u64 {
        self.resolved.load(Ordering::Relaxed)
    }

    pub fn exhausted(&self) -> u64 {
        self.exhausted.load(Ordering::Relaxed)
    }
}

/// Orchestrates the fixed-priority chain of price sources.
pub struct PriceResolver {
    config: Arc<NetworkConfig>,
    reader: Arc<dyn ChainReader>,
    sources: Vec<Arc<dyn PriceSource>>,
    guard: RecursionGuard,
    metrics: Arc<ResolverMetrics>,
}

impl PriceResolver {
    /// Build the resolver with the default source ordering. Fails only on
    /// malformed configuration.
    pub fn new(
        config: Arc<NetworkConfig>,
        reader: Arc<dyn ChainReader>,
    ) -> Result<Self, PriceError> {
        config.validate()?;
        let decimals = Arc::new(DecimalResolver::new());
        let sources = sources::default_chain(config.clone(), reader.clone(), decimals);
        Ok(Self {
            config,
            reader,
            sources,
            guard: RecursionGuard::new(),
            metrics: Arc::new(ResolverMetrics::default()),
        })
    }

    pub fn metrics(&self) -> &ResolverMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Walk the fallback chain and return the first successful quote, or
    /// the failure value once every source has been tried.
    pub async fn resolve_price_with_skip(
        &self,
        token: Address,
        block: u64,
        skip: &HashSet<SourceId>,
    ) -> PriceResult {
        if self.config.is_stable_coin(token) {
            trace!("token {:?} is a hardcoded stable, pegging to $1.00", token);
            return PriceResult::success(
                math::exponent_to_decimal(USDC_DECIMALS),
                USDC_DECIMALS,
                SourceId::HardcodedStable,
            );
        }

        let _guard = match self.guard.enter(token) {
            Ok(token_guard) => token_guard,
            Err(e) => {
                debug!("refusing to price token {:?}: {}", token, e);
                return PriceResult::failure();
            }
        };

        for source in &self.sources {
            let id = source.id();
            if skip.contains(&id) {
                continue;
            }
            if self.config.is_blacklisted(id, token) {
                trace!("[{}] token {:?} blacklisted, source skipped", id.tag(), token);
                continue;
            }

            self.metrics.record_invocation(id);
            match source.quote(token, block, self).await {
                Ok(result) if result.succeeded() => {
                    debug!(
                        "[{}] token {:?} priced at {} (block {})",
                        id.tag(),
                        token,
                        result.normalized(),
                        block
                    );
                    self.metrics.record_resolved();
                    return result;
                }
                Ok(_) => continue,
                Err(e) => {
                    trace!("[{}] token {:?}: {}", id.tag(), token, e);
                    continue;
                }
            }
        }

        self.metrics.record_exhausted();
        let name = self
            .reader
            .token_name(token, block)
            .await
            .unwrap_or_default();
        warn!(
            "failed to fetch price, name: {} address: {:?} block: {}",
            name, token, block
        );
        PriceResult::failure()
    }

    pub async fn resolve_price(&self, token: Address, block: u64) -> PriceResult {
        self.resolve_price_with_skip(token, block, &HashSet::new())
            .await
    }

    /// Convenience entrypoint: USD value of a human-decimal-adjusted
    /// `amount` of `token`. An unresolvable price degrades to zero under
    /// the explicit `UnknownPriceFallback::Zero` policy; callers that need
    /// to distinguish "unknown" from "worthless" use `resolve_price`.
    pub async fn price_of(&self, token: Address, amount: Decimal, block: u64) -> Decimal {
        let result = self.resolve_price(token, block).await;
        if result.succeeded() {
            result.normalized() * amount
        } else {
            UnknownPriceFallback::Zero.value_for_unknown()
        }
    }
}

#[async_trait]
impl PriceLookup for PriceResolver {
    async fn resolve_price(&self, token: Address, block: u64) -> PriceResult {
        PriceResolver::resolve_price(self, token, block).await
    }
}
