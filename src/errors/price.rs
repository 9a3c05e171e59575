//! Error types for historical price resolution.
//!
//! [`PriceSourceError`] describes why a single pricing tier could not produce a
//! quote. The resolver only moves past the historical tier when it had no data
//! or could not be reached; any other cause is surfaced as-is, wrapped in
//! [`PriceError::PriceUnavailable`].

use crate::chain::SupportedChain;

/// Why a single price tier could not produce a quote.
#[derive(Debug, thiserror::Error)]
pub enum PriceSourceError {
    /// The price service could not be reached.
    #[error("Price service request to {endpoint} failed")]
    Transport {
        /// The endpoint path that was requested (without query or API key)
        endpoint: String,
        /// The underlying HTTP error
        #[source]
        source: reqwest::Error,
    },

    /// The price service answered with a non-success status.
    #[error("Price service returned HTTP {status} for {endpoint}")]
    Status {
        /// The endpoint path that was requested
        endpoint: String,
        /// The HTTP status code
        status: u16,
    },

    /// The price service is reachable but has no data for the request
    /// (e.g. the date predates the token's listing).
    #[error("No price data: {details}")]
    NoData {
        /// What was missing
        details: String,
    },

    /// The response body could not be decoded.
    #[error("Failed to decode price response from {endpoint}")]
    Decode {
        /// The endpoint path that was requested
        endpoint: String,
        /// The underlying decoding error
        #[source]
        source: serde_json::Error,
    },

    /// The on-chain price read failed.
    #[error("On-chain price read failed: {0}")]
    OnChain(#[from] super::OracleError),
}

impl PriceSourceError {
    /// Create a `NoData` error.
    pub fn no_data(details: impl Into<String>) -> Self {
        PriceSourceError::NoData {
            details: details.into(),
        }
    }

    /// Returns true if the source was reachable but had nothing for the request.
    pub fn is_no_data(&self) -> bool {
        matches!(self, PriceSourceError::NoData { .. })
    }

    /// Returns true if the request never got an answer from the service.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, PriceSourceError::Transport { .. })
    }
}

/// Errors that can occur while resolving a price quote.
///
/// # Examples
///
/// ```rust,ignore
/// use asofscan::{Asset, PriceError, SupportedChain};
///
/// let asset = Asset::native(SupportedChain::Sepolia);
/// match resolver.resolve_price_for_date_str(&asset, "2024-05-01").await {
///     Err(PriceError::UnsupportedChain { chain }) => eprintln!("{chain} has no market"),
///     Err(PriceError::PriceUnavailable { source, .. }) => eprintln!("last tier: {source}"),
///     other => println!("{other:?}"),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    /// The chain has no price-platform mapping.
    #[error("Chain {chain} has no price platform mapping")]
    UnsupportedChain {
        /// The chain without a mapping
        chain: SupportedChain,
    },

    /// No tier produced a quote; `source` is the cause from the last tier tried.
    #[error("Price unavailable for {asset} on {date}")]
    PriceUnavailable {
        /// Asset identifier (contract address or native marker)
        asset: String,
        /// The requested date (`YYYY-MM-DD`)
        date: String,
        /// The last tier's failure
        #[source]
        source: PriceSourceError,
    },

    /// The calendar date could not be parsed.
    #[error("Invalid date '{input}': {reason}")]
    InvalidDate {
        /// The date as supplied by the caller
        input: String,
        /// Why it was rejected
        reason: String,
    },
}

impl PriceError {
    /// Create a `PriceUnavailable` error.
    pub fn unavailable(
        asset: impl Into<String>,
        date: impl Into<String>,
        source: PriceSourceError,
    ) -> Self {
        PriceError::PriceUnavailable {
            asset: asset.into(),
            date: date.into(),
            source,
        }
    }
}
