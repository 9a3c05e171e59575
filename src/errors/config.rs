//! Error types for configuration and the chain endpoint registry.

/// Errors raised while building configuration.
///
/// These are not recoverable at runtime: the binary exits when it sees one.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required credential (environment variable) is not set.
    #[error("Missing required network credential: set {variable}")]
    MissingCredential {
        /// Name of the environment variable that must be set
        variable: String,
    },

    /// An endpoint URL could not be parsed.
    #[error("Invalid URL '{url}'")]
    InvalidUrl {
        /// The offending URL (credentials redacted)
        url: String,
        /// The parse error
        #[source]
        source: url::ParseError,
    },

    /// A configuration value could not be parsed.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue {
        /// Configuration key or environment variable
        key: String,
        /// Why it was rejected
        reason: String,
    },
}

impl ConfigError {
    /// Create a `MissingCredential` error.
    pub fn missing_credential(variable: impl Into<String>) -> Self {
        ConfigError::MissingCredential {
            variable: variable.into(),
        }
    }

    /// Create an `InvalidValue` error.
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
