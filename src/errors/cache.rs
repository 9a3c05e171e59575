//! Error types for the memoization cache.

/// Errors that can occur while reading or writing a cache backend.
///
/// Read failures are downgraded to cache misses by the backends; write
/// failures are returned so the caller can decide whether to log them.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Filesystem error on the cache file or its directory.
    #[error("Cache I/O error at {path}: {details}")]
    Io {
        /// Path that caused the error
        path: String,
        /// What was being attempted
        details: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The cache contents could not be (de)serialized.
    #[error("Cache serialization error: {details}")]
    Serialization {
        /// What was being (de)serialized
        details: String,
        /// The underlying serde error
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    /// Create an `Io` error.
    pub fn io(path: impl Into<String>, details: impl Into<String>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            details: details.into(),
            source,
        }
    }

    /// Create a `Serialization` error.
    pub fn serialization(details: impl Into<String>, source: serde_json::Error) -> Self {
        CacheError::Serialization {
            details: details.into(),
            source,
        }
    }
}
