//! Error types for the block timestamp oracle and other direct RPC reads.

use crate::chain::SupportedChain;

/// Errors that can occur while querying a chain's RPC endpoint.
///
/// The temporal block resolver surfaces these verbatim: it never retries and
/// never caches a partial answer after one of them.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The endpoint was unreachable or returned a malformed or absent result.
    #[error("Oracle unavailable during {operation}")]
    OracleUnavailable {
        /// Description of the operation that failed (e.g. "eth_blockNumber on base")
        operation: String,
        /// The underlying transport or decoding error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The chain reports no block with this number.
    #[error("Block not found: {block_number}")]
    BlockNotFound {
        /// The block number that wasn't found
        block_number: u64,
    },

    /// No provider is configured for the chain.
    #[error("No RPC provider configured for chain {chain}")]
    ChainNotConfigured {
        /// The chain that has no provider
        chain: SupportedChain,
    },
}

impl OracleError {
    /// Create an `OracleUnavailable` error from any error type.
    pub fn unavailable(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        OracleError::OracleUnavailable {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Create an `OracleUnavailable` error from a plain message.
    pub fn malformed(operation: impl Into<String>, details: impl Into<String>) -> Self {
        let details: String = details.into();
        OracleError::OracleUnavailable {
            operation: operation.into(),
            source: details.into(),
        }
    }
}
