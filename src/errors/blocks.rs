//! Error types for temporal block resolution.

use super::OracleError;

/// Errors that can occur while resolving the as-of block for a timestamp.
///
/// # Examples
///
/// ```rust,ignore
/// use asofscan::{BlockResolveError, SupportedChain, UnixTimestamp};
///
/// match resolver.resolve_block(SupportedChain::Arbitrum, UnixTimestamp(1714521600)).await {
///     Ok(block) => println!("block {block}"),
///     Err(BlockResolveError::InvalidRange { reason }) => eprintln!("bad bounds: {reason}"),
///     Err(BlockResolveError::Oracle(e)) => eprintln!("RPC failure: {e}"),
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum BlockResolveError {
    /// The search bounds are degenerate (e.g. the chain reports height 0).
    #[error("Invalid block range: {reason}")]
    InvalidRange {
        /// Description of why the range is invalid
        reason: String,
    },

    /// The calendar date could not be parsed or converted to a timestamp.
    #[error("Invalid date '{input}': {reason}")]
    InvalidDate {
        /// The date as supplied by the caller
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// The block timestamp oracle failed; the resolution was aborted.
    #[error("RPC error: {0}")]
    Oracle(#[from] OracleError),
}

impl BlockResolveError {
    /// Create an `InvalidRange` error with a reason.
    pub fn invalid_range(reason: impl Into<String>) -> Self {
        BlockResolveError::InvalidRange {
            reason: reason.into(),
        }
    }

    /// Create an `InvalidDate` error.
    pub fn invalid_date(input: impl Into<String>, reason: impl Into<String>) -> Self {
        BlockResolveError::InvalidDate {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
