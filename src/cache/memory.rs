// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory cache implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use super::{CacheStats, MemoCache, PutOutcome};
use crate::errors::CacheError;

/// Internal state for memory cache
#[derive(Debug, Default)]
struct MemoryCacheState {
    entries: HashMap<String, String>,
    stats: CacheStats,
}

/// In-memory cache
///
/// Stores entries in a `HashMap` for the lifetime of the value. Same write
/// semantics as [`DiskCache`](super::DiskCache), without persistence.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use asofscan::cache::{MemoCache, MemoryCache};
///
/// let cache: Arc<dyn MemoCache> = Arc::new(MemoryCache::new());
/// ```
#[derive(Debug, Default)]
pub struct MemoryCache {
    state: Mutex<MemoryCacheState>,
}

impl MemoryCache {
    /// Creates an empty memory cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored key, sorted
    pub async fn keys(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut keys: Vec<String> = state.entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl MemoCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut state = self.state.lock().await;

        let value = state.entries.get(key).cloned();
        if value.is_some() {
            state.stats.hits += 1;
            debug!(key = %key, "Cache hit (memory)");
        } else {
            state.stats.misses += 1;
            debug!(key = %key, "Cache miss (memory)");
        }
        value
    }

    async fn put(&self, key: &str, value: String) -> Result<(), CacheError> {
        let mut state = self.state.lock().await;

        match PutOutcome::classify(key, state.entries.get(key), &value) {
            PutOutcome::Unchanged => {}
            PutOutcome::Conflict => state.stats.conflicts += 1,
            PutOutcome::Written => {
                state.entries.insert(key.to_string(), value);
                state.stats.writes += 1;
            }
        }
        state.stats.entries = state.entries.len();
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        self.state.lock().await.stats.clone()
    }

    fn name(&self) -> &'static str {
        "MemoryCache"
    }
}
