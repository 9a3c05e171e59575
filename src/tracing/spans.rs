//! Span creation helpers for asofscan operations.
//!
//! Telemetry is kept out of the business logic: each instrumented operation
//! has a span helper here, and the operation attaches it to its future.
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(&self, chain: SupportedChain) -> Result<T, E> {
//!     let span = spans::my_operation(chain);
//!     async move {
//!         // Business logic here
//!     }
//!     .instrument(span)
//!     .await
//! }
//! ```

use alloy_primitives::{Address, BlockNumber};
use chrono::NaiveDate;
use tracing::{Level, Span};

use crate::blocks::UnixTimestamp;
use crate::chain::SupportedChain;

/// Create span for resolving the as-of block of a timestamp.
///
/// Parent: None (root span for this operation)
/// Children: get_current_height, get_block_timestamp spans, `asofscan.rpc` spans
#[inline]
pub(crate) fn resolve_block(chain: SupportedChain, target: UnixTimestamp) -> Span {
    tracing::span!(
        Level::INFO,
        "asofscan.resolve_block",
        chain = %chain,
        target_ts = target.0,
    )
}

/// Create span for fetching the chain tip.
///
/// Parent: resolve_block span
#[inline]
pub(crate) fn get_current_height(chain: SupportedChain) -> Span {
    tracing::debug_span!("asofscan.get_current_height", chain = %chain)
}

/// Create span for fetching one block's timestamp during bisection.
///
/// Parent: resolve_block span
#[inline]
pub(crate) fn get_block_timestamp(chain: SupportedChain, block: BlockNumber) -> Span {
    tracing::trace_span!(
        "asofscan.get_block_timestamp",
        chain = %chain,
        block_number = block,
    )
}

/// Create span for resolving a price quote.
///
/// Parent: None (root span for this operation)
/// Children: read_oracle_price, price_api_request spans
#[inline]
pub(crate) fn resolve_price(chain: SupportedChain, asset: &str, date: NaiveDate) -> Span {
    tracing::span!(
        Level::INFO,
        "asofscan.resolve_price",
        chain = %chain,
        asset = %asset,
        date = %date,
        tier = tracing::field::Empty,
    )
}

/// Create span for reading the special asset's on-chain price.
///
/// Parent: resolve_price span
#[inline]
pub(crate) fn read_oracle_price(chain: SupportedChain, oracle: Address) -> Span {
    tracing::debug_span!(
        "asofscan.read_oracle_price",
        chain = %chain,
        oracle = %oracle,
    )
}

/// Create span for a request to the market price service.
///
/// Parent: resolve_price span
#[inline]
pub(crate) fn price_api_request(endpoint: &str) -> Span {
    tracing::debug_span!("asofscan.price_api_request", endpoint = %endpoint)
}

/// Create span for reading a holder's balance at a block.
///
/// Parent: None (root span for this operation)
#[inline]
pub(crate) fn balance_at(chain: SupportedChain, holder: Address, block: BlockNumber) -> Span {
    tracing::span!(
        Level::INFO,
        "asofscan.balance_at",
        chain = %chain,
        holder = %holder,
        block_number = block,
    )
}
