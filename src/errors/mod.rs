//! Error types for the asofscan library.
//!
//! Each resolver has its own error type so callers can react to the precise
//! failure, and [`AsofError`] unifies them for callers that only need to
//! report a message.
//!
//! - [`OracleError`] - block height / block timestamp RPC failures
//! - [`BlockResolveError`] - temporal block resolution (wraps [`OracleError`])
//! - [`PriceError`] - historical price resolution (wraps [`PriceSourceError`])
//! - [`CacheError`] - memoization cache I/O and serialization
//! - [`ConfigError`] - endpoint registry and configuration loading
//!
//! # Examples
//!
//! ```rust,ignore
//! use asofscan::{BlockResolveError, OracleError, SupportedChain};
//!
//! match resolver.resolve_block_for_date_str(SupportedChain::Base, "2024-05-01").await {
//!     Ok(block) => println!("as-of block: {block}"),
//!     Err(BlockResolveError::Oracle(OracleError::OracleUnavailable { operation, .. })) => {
//!         eprintln!("node unreachable during {operation}");
//!     }
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

mod blocks;
mod cache;
mod config;
mod price;
mod rpc;

pub use blocks::BlockResolveError;
pub use cache::CacheError;
pub use config::ConfigError;
pub use price::{PriceError, PriceSourceError};
pub use rpc::OracleError;

/// Unified error type for all asofscan operations.
///
/// Every module-specific error converts into `AsofError` via `From`, so `?`
/// works across resolver boundaries.
#[derive(Debug, thiserror::Error)]
pub enum AsofError {
    /// Error from temporal block resolution.
    #[error("Block resolution error: {0}")]
    Block(#[from] BlockResolveError),

    /// Error from historical price resolution.
    #[error("Price resolution error: {0}")]
    Price(#[from] PriceError),

    /// Error from a direct oracle call (e.g. a balance read).
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    /// Error from the memoization cache.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Error while loading configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
