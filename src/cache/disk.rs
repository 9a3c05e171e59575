//! Disk-based cache implementation with file locking and versioning
//!
//! File locks and filesystem calls can block for as long as another process
//! holds the lock, so they run on tokio's blocking pool.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{CacheStats, MemoCache, PutOutcome};
use crate::errors::CacheError;

/// Current cache format version
const CACHE_VERSION: u32 = 1;

/// Serialized cache format (versioned)
#[derive(Debug, Serialize, Deserialize)]
struct CacheData {
    /// Cache format version
    version: u32,
    /// Cached entries, sorted so the file diffs cleanly
    entries: BTreeMap<String, String>,
}

impl Default for CacheData {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// Internal state for disk cache
#[derive(Debug, Default)]
struct DiskCacheState {
    /// Cache statistics (in-memory only, not persisted)
    stats: CacheStats,
}

/// Synchronous access to the cache file and its sidecar lock
#[derive(Debug, Clone)]
struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    fn io_err(path: &Path, details: &str, e: std::io::Error) -> CacheError {
        CacheError::io(path.display().to_string(), details, e)
    }

    /// Opens (creating if needed) the sidecar lock file
    fn open_lock_file(&self) -> Result<File, CacheError> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Self::io_err(parent, "creating cache directory", e))?;
            }
        }
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| Self::io_err(&lock_path, "opening lock file", e))
    }

    /// Reads cache data; caller must hold a lock on the sidecar file
    ///
    /// A missing, corrupt, or foreign-version file yields an empty cache.
    fn read_data(&self) -> Result<CacheData, CacheError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Cache file does not exist, using empty cache");
            return Ok(CacheData::default());
        }

        let file = File::open(&self.path)
            .map_err(|e| Self::io_err(&self.path, "opening cache file", e))?;

        let data: CacheData = match serde_json::from_reader(&file) {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to parse cache file, using empty cache"
                );
                return Ok(CacheData::default());
            }
        };

        if data.version != CACHE_VERSION {
            warn!(
                path = %self.path.display(),
                cached_version = data.version,
                current_version = CACHE_VERSION,
                "Cache version mismatch, ignoring cached data"
            );
            return Ok(CacheData::default());
        }

        Ok(data)
    }

    /// Loads cache data under a shared lock
    fn load(&self) -> Result<CacheData, CacheError> {
        let lock = self.open_lock_file()?;
        lock.lock_shared()
            .map_err(|e| Self::io_err(&self.lock_path(), "acquiring read lock", e))?;
        let data = self.read_data();
        // released when `lock` drops
        drop(lock);
        data
    }

    /// Writes cache data atomically; caller must hold the exclusive lock
    fn write_data(&self, data: &CacheData) -> Result<(), CacheError> {
        let json = serde_json::to_vec_pretty(data)
            .map_err(|e| CacheError::serialization("cache file contents", e))?;

        let temp_path = self.temp_path();
        let mut temp = File::create(&temp_path)
            .map_err(|e| Self::io_err(&temp_path, "creating temp cache file", e))?;
        temp.write_all(&json)
            .map_err(|e| Self::io_err(&temp_path, "writing temp cache file", e))?;
        temp.sync_all()
            .map_err(|e| Self::io_err(&temp_path, "syncing temp cache file", e))?;
        drop(temp);

        std::fs::rename(&temp_path, &self.path)
            .map_err(|e| Self::io_err(&self.path, "renaming temp cache file into place", e))?;

        debug!(
            path = %self.path.display(),
            entries = data.entries.len(),
            "Saved memoization cache"
        );
        Ok(())
    }

    /// Read-classify-write under the exclusive lock
    ///
    /// Returns the outcome and the entry count after the put.
    fn put(&self, key: &str, value: String) -> Result<(PutOutcome, usize), CacheError> {
        let lock = self.open_lock_file()?;
        lock.lock()
            .map_err(|e| Self::io_err(&self.lock_path(), "acquiring write lock", e))?;

        let mut data = self.read_data()?;
        let outcome = PutOutcome::classify(key, data.entries.get(key), &value);
        if outcome == PutOutcome::Written {
            data.entries.insert(key.to_string(), value);
            self.write_data(&data)?;
        }

        drop(lock);
        Ok((outcome, data.entries.len()))
    }
}

/// Disk-based cache with file locking and versioning
///
/// Entries are persisted as a single JSON document:
/// - Advisory locking on a sidecar `.lock` file for multi-process safety
/// - Atomic writes via temp file, `sync_all` and rename
/// - Cache format versioning; a file with another version is ignored
/// - A corrupt file is treated as empty and replaced on the next write
///
/// # Examples
///
/// ```rust,ignore
/// use asofscan::cache::DiskCache;
///
/// let cache = DiskCache::new("/var/cache/asofscan.json").validate()?;
/// ```
#[derive(Debug)]
pub struct DiskCache {
    file: CacheFile,
    state: Mutex<DiskCacheState>,
}

impl DiskCache {
    /// Creates a new disk cache at the specified path
    ///
    /// Path validation is NOT performed until the first I/O operation. Use
    /// [`validate()`](Self::validate) to check the path immediately.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: CacheFile { path: path.into() },
            state: Mutex::new(DiskCacheState::default()),
        }
    }

    /// Location of the cache file
    pub fn path(&self) -> &Path {
        &self.file.path
    }

    /// Validates the cache path and creates parent directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or is not writable.
    pub fn validate(self) -> Result<Self, CacheError> {
        let parent = self.parent_dir();

        if !parent.exists() {
            std::fs::create_dir_all(&parent).map_err(|e| {
                CacheError::io(parent.display().to_string(), "creating cache directory", e)
            })?;
            debug!(path = %parent.display(), "Created cache directory");
        }

        let test_file = parent.join(".asofscan_write_test");
        std::fs::write(&test_file, b"test").map_err(|e| {
            CacheError::io(parent.display().to_string(), "cache directory is not writable", e)
        })?;
        let _ = std::fs::remove_file(&test_file);

        debug!(path = %self.path().display(), "Cache path validated successfully");
        Ok(self)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path().parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Runs `op` against the cache file on the blocking pool
    async fn with_file<T, F>(&self, op: F) -> Result<T, CacheError>
    where
        T: Send + 'static,
        F: FnOnce(&CacheFile) -> Result<T, CacheError> + Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || op(&file))
            .await
            .map_err(|e| {
                CacheError::io(
                    self.path().display().to_string(),
                    "cache file task did not complete",
                    std::io::Error::other(e),
                )
            })?
    }

    async fn load(&self) -> Result<CacheData, CacheError> {
        self.with_file(CacheFile::load).await
    }
}

#[async_trait]
impl MemoCache for DiskCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut state = self.state.lock().await;

        let data = match self.load().await {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Failed to load cache, treating as miss");
                state.stats.misses += 1;
                return None;
            }
        };
        state.stats.entries = data.entries.len();

        match data.entries.get(key) {
            Some(value) => {
                state.stats.hits += 1;
                debug!(key = %key, "Cache hit (disk)");
                Some(value.clone())
            }
            None => {
                state.stats.misses += 1;
                debug!(key = %key, "Cache miss (disk)");
                None
            }
        }
    }

    async fn put(&self, key: &str, value: String) -> Result<(), CacheError> {
        let mut state = self.state.lock().await;

        let owned_key = key.to_string();
        let (outcome, entries) = self
            .with_file(move |file| file.put(&owned_key, value))
            .await?;

        match outcome {
            PutOutcome::Unchanged => {}
            PutOutcome::Conflict => state.stats.conflicts += 1,
            PutOutcome::Written => state.stats.writes += 1,
        }
        state.stats.entries = entries;
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        let mut state = self.state.lock().await;

        if let Ok(data) = self.load().await {
            state.stats.entries = data.entries.len();
        }

        state.stats.clone()
    }

    fn name(&self) -> &'static str {
        "DiskCache"
    }
}

impl DiskCache {
    /// Logs the number of entries currently persisted
    pub async fn log_summary(&self) {
        let stats = self.stats().await;
        info!(
            path = %self.path().display(),
            entries = stats.entries,
            version = CACHE_VERSION,
            "Loaded memoization cache"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_disk_cache_basic_operations() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DiskCache::new(temp_dir.path().join("cache.json"))
            .validate()
            .unwrap();

        assert!(cache.get("block:1:100").await.is_none());

        cache.put("block:1:100", "12".to_string()).await.unwrap();
        assert_eq!(cache.get("block:1:100").await.as_deref(), Some("12"));

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_disk_cache_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let cache_path = temp_dir.path().join("cache.json");

        {
            let cache = DiskCache::new(&cache_path).validate().unwrap();
            cache.put("block:8453:1", "7".to_string()).await.unwrap();
        }

        {
            let cache = DiskCache::new(&cache_path).validate().unwrap();
            assert_eq!(cache.get("block:8453:1").await.as_deref(), Some("7"));
        }
    }

    #[tokio::test]
    async fn test_disk_cache_keeps_first_value() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DiskCache::new(temp_dir.path().join("cache.json"))
            .validate()
            .unwrap();

        cache.put("k", "first".to_string()).await.unwrap();
        cache.put("k", "first".to_string()).await.unwrap();
        cache.put("k", "second".to_string()).await.unwrap();

        assert_eq!(cache.get("k").await.as_deref(), Some("first"));
        let stats = cache.stats().await;
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.conflicts, 1);
    }

    #[tokio::test]
    async fn test_disk_cache_recovers_from_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let cache_path = temp_dir.path().join("cache.json");
        std::fs::write(&cache_path, b"{ this is not json").unwrap();

        let cache = DiskCache::new(&cache_path).validate().unwrap();
        assert!(cache.get("k").await.is_none());

        cache.put("k", "v".to_string()).await.unwrap();
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_disk_cache_ignores_other_versions() {
        let temp_dir = TempDir::new().unwrap();
        let cache_path = temp_dir.path().join("cache.json");
        std::fs::write(&cache_path, br#"{"version":99,"entries":{"k":"v"}}"#).unwrap();

        let cache = DiskCache::new(&cache_path).validate().unwrap();
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_foreign_lock_holder_does_not_stall_the_runtime() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DiskCache::new(temp_dir.path().join("cache.json"))
            .validate()
            .unwrap();
        cache.put("k", "v".to_string()).await.unwrap();

        // another process's writer, as far as flock is concerned
        let holder = File::create(temp_dir.path().join("cache.lock")).unwrap();
        holder.lock().unwrap();

        let waited =
            tokio::time::timeout(std::time::Duration::from_millis(100), cache.get("k")).await;
        assert!(waited.is_err(), "read should still be waiting for the lock");

        drop(holder);
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_disk_cache_validation_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let cache_path = temp_dir.path().join("subdir").join("cache.json");

        let cache = DiskCache::new(&cache_path).validate();
        assert!(cache.is_ok());
        assert!(cache_path.parent().unwrap().exists());
    }
}
