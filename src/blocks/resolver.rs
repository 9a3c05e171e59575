// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Temporal block resolver
//!
//! Finds the block that represents a chain's state as of an instant: the
//! highest block whose timestamp does not exceed it.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Instrument};

use super::{BlockTimestampOracle, UnixTimestamp};
use crate::cache::{keys, CacheStats, MemoCache, MemoCacheExt};
use crate::chain::SupportedChain;
use crate::config::constants::INPUT_DATE_FORMAT;
use crate::errors::BlockResolveError;
use crate::tracing::spans;

/// The as-of block for an instant on a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBlock {
    pub chain: SupportedChain,
    pub block_number: u64,
}

/// Resolves instants to block numbers by binary search over block timestamps
///
/// Results are memoized in the shared [`MemoCache`]; a repeated query makes
/// no RPC calls at all.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use asofscan::{DiskCache, ProviderOracle, SupportedChain, TemporalBlockResolver};
///
/// let resolver = TemporalBlockResolver::new(
///     Arc::new(ProviderOracle::new(pool)),
///     Arc::new(DiskCache::new("asofscan-cache.json").validate()?),
/// );
/// let block = resolver
///     .resolve_block_for_date_str(SupportedChain::Arbitrum, "2024-05-01")
///     .await?;
/// ```
pub struct TemporalBlockResolver {
    oracle: Arc<dyn BlockTimestampOracle>,
    cache: Arc<dyn MemoCache>,
}

impl TemporalBlockResolver {
    pub fn new(oracle: Arc<dyn BlockTimestampOracle>, cache: Arc<dyn MemoCache>) -> Self {
        Self { oracle, cache }
    }

    /// Returns current cache statistics
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// The highest block on `chain` whose timestamp is at or before `target`
    ///
    /// A target before block 1 resolves to block 1. A target after the chain
    /// tip resolves to the tip.
    ///
    /// # Errors
    ///
    /// - [`BlockResolveError::InvalidRange`] if the chain reports height 0
    /// - [`BlockResolveError::Oracle`] for any RPC failure; nothing is cached
    pub async fn resolve_block(
        &self,
        chain: SupportedChain,
        target: UnixTimestamp,
    ) -> Result<u64, BlockResolveError> {
        let span = spans::resolve_block(chain, target);
        async move {
            let key = keys::block_key(chain, target);

            if let Some(block) = self.cache.get_json::<u64>(&key).await {
                info!(
                    chain = %chain,
                    target_ts = target.0,
                    block_number = block,
                    cache = %self.cache.name(),
                    cached = true,
                    "Retrieved as-of block from cache"
                );
                return Ok(block);
            }

            let height = self.oracle.current_height(chain).await?;
            if height < 1 {
                return Err(BlockResolveError::invalid_range(format!(
                    "{chain} reports height {height}, need at least 1"
                )));
            }

            let block = self.find_last_block_at_or_before(chain, target, height).await?;

            if let Err(e) = self.cache.put_json(&key, &block).await {
                warn!(key = %key, error = %e, "Failed to cache resolved block");
            }

            info!(
                chain = %chain,
                target_ts = target.0,
                block_number = block,
                height,
                "Resolved as-of block"
            );
            Ok(block)
        }
        .instrument(span)
        .await
    }

    /// Like [`resolve_block`](Self::resolve_block), tagged with the chain
    pub async fn resolve(
        &self,
        chain: SupportedChain,
        target: UnixTimestamp,
    ) -> Result<ResolvedBlock, BlockResolveError> {
        let block_number = self.resolve_block(chain, target).await?;
        Ok(ResolvedBlock {
            chain,
            block_number,
        })
    }

    /// The as-of block for the end of `date` (23:59:59 UTC)
    pub async fn resolve_block_for_date(
        &self,
        chain: SupportedChain,
        date: NaiveDate,
    ) -> Result<u64, BlockResolveError> {
        self.resolve_block(chain, UnixTimestamp::end_of_day(date))
            .await
    }

    /// The as-of block for a `YYYY-MM-DD` date string
    ///
    /// # Errors
    ///
    /// [`BlockResolveError::InvalidDate`] if the string does not parse.
    pub async fn resolve_block_for_date_str(
        &self,
        chain: SupportedChain,
        date: &str,
    ) -> Result<u64, BlockResolveError> {
        let parsed = NaiveDate::parse_from_str(date.trim(), INPUT_DATE_FORMAT)
            .map_err(|e| BlockResolveError::invalid_date(date, e.to_string()))?;
        self.resolve_block_for_date(chain, parsed).await
    }

    /// Binary search for the last block with timestamp <= target in `[1, height]`
    ///
    /// - **Invariant**: every block below `lo` has timestamp <= target
    /// - **Invariant**: every block above `hi` has timestamp > target
    /// - One `timestamp_of` call per iteration, sequential
    async fn find_last_block_at_or_before(
        &self,
        chain: SupportedChain,
        target: UnixTimestamp,
        height: u64,
    ) -> Result<u64, BlockResolveError> {
        let mut lo = 1u64;
        let mut hi = height;
        let mut best: Option<u64> = None;
        let mut probes = 0u32;

        while lo <= hi {
            let mid = lo + (hi - lo) / 2;
            let ts = self.oracle.timestamp_of(chain, mid).await?;
            probes += 1;

            if ts <= target {
                best = Some(mid);
                lo = mid + 1;
            } else {
                // mid >= 1, so this cannot underflow; hi = 0 ends the loop
                hi = mid - 1;
            }
        }

        match best {
            Some(block) => {
                debug!(chain = %chain, target_ts = target.0, block_number = block, probes, "Bisection finished");
                Ok(block)
            }
            None => {
                debug!(chain = %chain, target_ts = target.0, probes, "Target predates block 1, clamping");
                Ok(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::errors::OracleError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Block n has timestamp 1000 + 12n
    struct LinearOracle {
        height: u64,
        calls: AtomicUsize,
    }

    impl LinearOracle {
        fn new(height: u64) -> Self {
            Self {
                height,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BlockTimestampOracle for LinearOracle {
        async fn current_height(&self, _chain: SupportedChain) -> Result<u64, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.height)
        }

        async fn timestamp_of(
            &self,
            _chain: SupportedChain,
            block: u64,
        ) -> Result<UnixTimestamp, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(UnixTimestamp(1000 + 12 * block as i64))
        }
    }

    fn resolver(oracle: Arc<LinearOracle>) -> TemporalBlockResolver {
        TemporalBlockResolver::new(oracle, Arc::new(MemoryCache::new()))
    }

    #[tokio::test]
    async fn test_between_blocks_picks_earlier() {
        let resolver = resolver(Arc::new(LinearOracle::new(100)));
        // block 10 at 1120, block 11 at 1132
        let block = resolver
            .resolve_block(SupportedChain::Base, UnixTimestamp(1125))
            .await
            .unwrap();
        assert_eq!(block, 10);
    }

    #[tokio::test]
    async fn test_height_one() {
        let resolver = resolver(Arc::new(LinearOracle::new(1)));
        let block = resolver
            .resolve_block(SupportedChain::Base, UnixTimestamp(5000))
            .await
            .unwrap();
        assert_eq!(block, 1);
    }

    #[tokio::test]
    async fn test_height_zero_is_invalid_range() {
        let resolver = resolver(Arc::new(LinearOracle::new(0)));
        let err = resolver
            .resolve_block(SupportedChain::Base, UnixTimestamp(5000))
            .await
            .unwrap_err();
        assert!(matches!(err, BlockResolveError::InvalidRange { .. }));
    }

    #[tokio::test]
    async fn test_bad_date_string() {
        let resolver = resolver(Arc::new(LinearOracle::new(10)));
        let err = resolver
            .resolve_block_for_date_str(SupportedChain::Base, "01/05/2024")
            .await
            .unwrap_err();
        assert!(matches!(err, BlockResolveError::InvalidDate { .. }));
    }

    #[tokio::test]
    async fn test_probe_count_is_logarithmic() {
        let oracle = Arc::new(LinearOracle::new(1_000_000));
        let resolver = resolver(oracle.clone());

        resolver
            .resolve_block(SupportedChain::Mainnet, UnixTimestamp(1000 + 12 * 777_777))
            .await
            .unwrap();

        // one height call plus at most ceil(log2(1e6)) + 1 probes
        assert!(oracle.calls.load(Ordering::SeqCst) <= 22);
    }
}
