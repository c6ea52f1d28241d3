//! # Centralized Error Handling
//!
//! Typed errors for the price engine. Source failures are deliberately
//! non-fatal: the resolver converts any `PriceError` returned by an adapter
//! into "skip this source and try the next one". Only malformed
//! configuration, rejected once at resolver construction, is treated as a
//! deployment error.

use ethers::types::Address;
use thiserror::Error;

/// Failure of a single external contract read.
///
/// Reverts, missing functions, and absent contracts are indistinguishable to
/// the engine and are all modeled as `Reverted`.
#[derive(Error, Debug, Clone)]
pub enum CallError {
    #[error("contract call reverted: {0}")]
    Reverted(String),
}

impl CallError {
    pub fn reverted(context: impl Into<String>) -> Self {
        CallError::Reverted(context.into())
    }
}

/// Errors raised while resolving a token price.
///
/// Every variant except `Config` disqualifies one source for one query and
/// is swallowed by the resolver's fallback walk.
#[derive(Error, Debug, Clone)]
pub enum PriceError {
    /// The source has no contract configured on this network, or the query
    /// block precedes the contract's activation height.
    #[error("source not configured or inactive at block {block}")]
    SourceUnavailable { block: u64 },
    #[error("token {0:?} is blacklisted for this source")]
    Blacklisted(Address),
    #[error("contract call reverted: {0}")]
    CallReverted(String),
    #[error("division by zero while computing {0}")]
    ZeroDivision(&'static str),
    /// Cycle detected or recursion depth exceeded while valuing a pool
    /// token. Fails closed instead of looping.
    #[error("recursion limit reached while pricing token {0:?}")]
    RecursionLimit(Address),
    #[error("all price sources exhausted for token {0:?}")]
    AllSourcesExhausted(Address),
    #[error("price normalization error: {0}")]
    Normalization(String),
    /// Malformed network configuration. The only fatal case.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<CallError> for PriceError {
    fn from(e: CallError) -> Self {
        match e {
            CallError::Reverted(msg) => PriceError::CallReverted(msg),
        }
    }
}
