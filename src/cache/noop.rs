//! No-operation cache that disables memoization entirely

use async_trait::async_trait;

use super::{CacheStats, MemoCache};
use crate::errors::CacheError;

/// A no-operation cache that disables memoization entirely
///
/// Always misses and ignores writes, so every resolution hits the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCache;

#[async_trait]
impl MemoCache for NoOpCache {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn put(&self, _key: &str, _value: String) -> Result<(), CacheError> {
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    fn name(&self) -> &'static str {
        "NoOpCache"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_cache_always_misses() {
        let cache = NoOpCache;
        cache.put("k", "v".to_string()).await.unwrap();
        assert!(cache.get("k").await.is_none());
        assert_eq!(cache.stats().await, CacheStats::default());
    }
}
