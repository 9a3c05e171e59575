// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Memoization cache backends
//!
//! Resolved blocks and price quotes are historical facts: once computed they
//! never change, so the cache has no TTL, no eviction and no size bound. Keys
//! and values are plain strings; values are JSON in practice, see
//! [`MemoCacheExt`].
//!
//! - [`DiskCache`]: Persistent JSON file with advisory file locking (default)
//! - [`MemoryCache`]: In-process map, for tests and short-lived use
//! - [`NoOpCache`]: Disables memoization entirely
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use asofscan::cache::{DiskCache, MemoCache, MemoryCache, NoOpCache};
//!
//! let cache: Arc<dyn MemoCache> = Arc::new(DiskCache::new("asofscan-cache.json").validate()?);
//! let cache: Arc<dyn MemoCache> = Arc::new(MemoryCache::new());
//! let cache: Arc<dyn MemoCache> = Arc::new(NoOpCache);
//! ```

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::CacheError;

mod disk;
pub mod keys;
mod memory;
mod noop;

pub use disk::DiskCache;
pub use memory::MemoryCache;
pub use noop::NoOpCache;

/// Statistics about cache performance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cache hits (successful retrievals)
    pub hits: u64,
    /// Number of cache misses (key not found or unreadable)
    pub misses: u64,
    /// Number of new entries written
    pub writes: u64,
    /// Number of puts that tried to replace an entry with a different value
    pub conflicts: u64,
    /// Current number of entries in the cache
    pub entries: usize,
}

impl CacheStats {
    /// Calculates the cache hit rate as a percentage (0.0 to 100.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={}, misses={}, writes={}, conflicts={}, entries={}, hit_rate={:.1}%",
            self.hits,
            self.misses,
            self.writes,
            self.conflicts,
            self.entries,
            self.hit_rate()
        )
    }
}

/// Outcome of a put against the current contents of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PutOutcome {
    /// The key was absent and has been written
    Written,
    /// The key already held the same value
    Unchanged,
    /// The key already held a different value, which was kept
    Conflict,
}

impl PutOutcome {
    /// Decide how a put of `new` relates to the `existing` value of `key`
    pub(crate) fn classify(key: &str, existing: Option<&String>, new: &str) -> Self {
        match existing {
            None => PutOutcome::Written,
            Some(old) if old == new => PutOutcome::Unchanged,
            Some(old) => {
                warn!(
                    key = %key,
                    existing = %old,
                    rejected = %new,
                    "Refusing to replace cached value with a different one"
                );
                PutOutcome::Conflict
            }
        }
    }
}

/// Trait for memoization cache backends
///
/// # Thread Safety
///
/// Implementations must be thread-safe and support concurrent access. Use interior
/// mutability (e.g., `Mutex`, `RwLock`) as needed.
///
/// # Write semantics
///
/// A put for a key that already holds the same value is a no-op. A put for a
/// key that holds a *different* value keeps the first value and logs a warning.
///
/// # Error Handling
///
/// Read failures are logged and reported as misses. Write failures are
/// returned; resolvers log them and carry on, since the answer is already known.
#[async_trait]
pub trait MemoCache: Send + Sync {
    /// Returns the value stored under `key`, if any
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`; durable before returning
    async fn put(&self, key: &str, value: String) -> Result<(), CacheError>;

    /// Returns current cache statistics
    async fn stats(&self) -> CacheStats;

    /// Returns a human-readable name for this cache backend
    ///
    /// Used for logging and debugging.
    fn name(&self) -> &'static str;
}

/// Typed JSON access on top of any [`MemoCache`]
#[async_trait]
pub trait MemoCacheExt: MemoCache {
    /// Reads and decodes a JSON value; an undecodable entry counts as a miss
    async fn get_json<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned + Send,
    {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, cache = self.name(), "Undecodable cache entry, treating as miss");
                None
            }
        }
    }

    /// Encodes `value` as JSON and stores it
    async fn put_json<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize + Sync,
    {
        let raw = serde_json::to_string(value)
            .map_err(|e| CacheError::serialization(format!("value for key '{key}'"), e))?;
        self.put(key, raw).await
    }
}

impl<C: MemoCache + ?Sized> MemoCacheExt for C {}
