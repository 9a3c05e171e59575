//! Block timestamp oracle

use std::future::IntoFuture;
use std::sync::Arc;

use alloy_provider::Provider;
use alloy_rpc_types::BlockNumberOrTag;
use async_trait::async_trait;
use tracing::{trace, Instrument};

use super::UnixTimestamp;
use crate::chain::SupportedChain;
use crate::errors::OracleError;
use crate::provider::ProviderPool;
use crate::tracing::spans;

/// Source of a chain's current height and of individual block timestamps.
///
/// No caching happens at this layer; the resolver above it memoizes final
/// answers only.
#[async_trait]
pub trait BlockTimestampOracle: Send + Sync {
    /// The number of the latest block on `chain`.
    async fn current_height(&self, chain: SupportedChain) -> Result<u64, OracleError>;

    /// The timestamp of `block` on `chain`.
    ///
    /// [`OracleError::BlockNotFound`] if the chain reports no such block.
    async fn timestamp_of(
        &self,
        chain: SupportedChain,
        block: u64,
    ) -> Result<UnixTimestamp, OracleError>;
}

/// [`BlockTimestampOracle`] over the JSON-RPC providers of a [`ProviderPool`].
#[derive(Debug, Clone)]
pub struct ProviderOracle {
    pool: Arc<ProviderPool>,
}

impl ProviderOracle {
    pub fn new(pool: Arc<ProviderPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlockTimestampOracle for ProviderOracle {
    async fn current_height(&self, chain: SupportedChain) -> Result<u64, OracleError> {
        let provider = self.pool.get(chain)?;

        provider
            .get_block_number()
            .instrument(spans::get_current_height(chain))
            .await
            .map_err(|e| OracleError::unavailable(format!("eth_blockNumber on {chain}"), e))
    }

    async fn timestamp_of(
        &self,
        chain: SupportedChain,
        block: u64,
    ) -> Result<UnixTimestamp, OracleError> {
        let provider = self.pool.get(chain)?;

        let header = provider
            .get_block_by_number(BlockNumberOrTag::Number(block))
            .into_future()
            .instrument(spans::get_block_timestamp(chain, block))
            .await
            .map_err(|e| {
                OracleError::unavailable(format!("eth_getBlockByNumber({block}) on {chain}"), e)
            })?
            .ok_or(OracleError::BlockNotFound {
                block_number: block,
            })?
            .header;

        trace!(chain = %chain, block_number = block, timestamp = header.timestamp, "Fetched block timestamp");
        Ok(UnixTimestamp::from_u64(header.timestamp))
    }
}
