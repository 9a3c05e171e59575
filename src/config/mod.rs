//! Configuration for asofscan operations
//!
//! This module controls RPC behavior (timeouts, per-chain request pacing),
//! where the memoization cache lives, how the market price API is reached,
//! and the fallbacks used by the special-cased on-chain priced asset.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use asofscan::AsofConfig;
//!
//! // Common defaults: 30s RPC timeout, pacing on chains with strict public limits
//! let config = AsofConfig::default();
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use asofscan::{AsofConfigBuilder, SupportedChain};
//! use std::time::Duration;
//!
//! let config = AsofConfigBuilder::with_defaults()
//!     .cache_path("/var/cache/asofscan.json")
//!     .chain_rate_limit(SupportedChain::Arbitrum, Duration::from_millis(100))
//!     .price_api_key("CG-demo-key")
//!     .build();
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::chain::SupportedChain;
use crate::errors::ConfigError;
use crate::price::{ForexRates, SpecialAsset};

pub mod constants;

/// Environment variable overriding the cache file location
pub const CACHE_PATH_ENV: &str = "ASOFSCAN_CACHE_PATH";
/// Environment variable overriding the price API base URL
pub const PRICE_API_URL_ENV: &str = "ASOFSCAN_PRICE_API_URL";
/// Environment variable holding the price API key
pub const PRICE_API_KEY_ENV: &str = "ASOFSCAN_PRICE_API_KEY";
/// Environment variable setting a global delay between RPC requests, in milliseconds
pub const RPC_DELAY_MS_ENV: &str = "ASOFSCAN_RPC_DELAY_MS";
/// Environment variable setting the RPC timeout, in seconds
pub const RPC_TIMEOUT_SECS_ENV: &str = "ASOFSCAN_RPC_TIMEOUT_SECS";

/// Configuration for asofscan operations
///
/// Use [`AsofConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone)]
pub struct AsofConfig {
    /// Location of the persistent memoization cache
    /// Default: `asofscan-cache.json` in the working directory
    pub cache_path: PathBuf,

    /// Minimum delay between RPC requests to avoid rate limiting
    /// Default: None (no delay)
    pub rate_limit_delay: Option<Duration>,

    /// Timeout for RPC requests
    /// Default: 30 seconds
    pub rpc_timeout: Duration,

    /// Chain-specific overrides
    pub chain_overrides: HashMap<SupportedChain, ChainConfig>,

    /// How to reach the market price API
    pub price_api: PriceApiConfig,

    /// The asset priced from its own on-chain oracle, if any
    pub special_asset: Option<SpecialAsset>,

    /// Forex rates of the reference stable asset used when the live fetch fails
    pub fallback_rates: ForexRates,
}

/// Chain-specific configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ChainConfig {
    /// Override rate limit delay for this chain
    pub rate_limit_delay: Option<Duration>,

    /// Override RPC timeout for this chain
    pub rpc_timeout: Option<Duration>,
}

/// Market price API settings
#[derive(Debug, Clone)]
pub struct PriceApiConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Optional API key sent as a request header
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for PriceApiConfig {
    fn default() -> Self {
        Self {
            base_url: constants::COINGECKO_API_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(20),
        }
    }
}

impl Default for AsofConfig {
    fn default() -> Self {
        Self::with_common_defaults()
    }
}

impl AsofConfig {
    /// Create config with defaults suited to hosted RPC providers
    ///
    /// Base and BNB Smart Chain endpoints are paced at 250ms between requests;
    /// their public tiers reject bursts of the ~30 sequential probes a block
    /// search issues.
    pub fn with_common_defaults() -> Self {
        let mut config = Self::minimal();

        for chain in [SupportedChain::Base, SupportedChain::BinanceSmartChain] {
            config.set_chain_override(
                chain,
                ChainConfig {
                    rate_limit_delay: Some(Duration::from_millis(250)),
                    rpc_timeout: None,
                },
            );
        }

        config
    }

    /// Create minimal config with no delays
    ///
    /// Suitable for tests or premium RPC endpoints.
    pub fn minimal() -> Self {
        Self {
            cache_path: PathBuf::from("asofscan-cache.json"),
            rate_limit_delay: None,
            rpc_timeout: Duration::from_secs(30),
            chain_overrides: HashMap::new(),
            price_api: PriceApiConfig::default(),
            special_asset: Some(SpecialAsset::default()),
            fallback_rates: ForexRates::fallback(),
        }
    }

    /// Common defaults overlaid with values from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Common defaults overlaid with values from `lookup`
    ///
    /// `lookup` maps a variable name to its value; [`from_env`](Self::from_env)
    /// passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::with_common_defaults();

        if let Some(path) = lookup(CACHE_PATH_ENV) {
            config.cache_path = PathBuf::from(path);
        }
        if let Some(url) = lookup(PRICE_API_URL_ENV) {
            config.price_api.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(key) = lookup(PRICE_API_KEY_ENV).filter(|k| !k.is_empty()) {
            config.price_api.api_key = Some(key);
        }
        if let Some(ms) = lookup(RPC_DELAY_MS_ENV) {
            let ms: u64 = ms
                .parse()
                .map_err(|e| ConfigError::invalid_value(RPC_DELAY_MS_ENV, format!("{e}")))?;
            config.rate_limit_delay = Some(Duration::from_millis(ms));
        }
        if let Some(secs) = lookup(RPC_TIMEOUT_SECS_ENV) {
            let secs: u64 = secs
                .parse()
                .map_err(|e| ConfigError::invalid_value(RPC_TIMEOUT_SECS_ENV, format!("{e}")))?;
            config.rpc_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Get effective rate limit delay for a specific chain
    ///
    /// Returns chain-specific override if set, otherwise returns global default.
    pub fn get_rate_limit_delay(&self, chain: SupportedChain) -> Option<Duration> {
        self.chain_overrides
            .get(&chain)
            .and_then(|c| c.rate_limit_delay)
            .or(self.rate_limit_delay)
    }

    /// Get effective RPC timeout for a specific chain
    pub fn get_rpc_timeout(&self, chain: SupportedChain) -> Duration {
        self.chain_overrides
            .get(&chain)
            .and_then(|c| c.rpc_timeout)
            .unwrap_or(self.rpc_timeout)
    }

    /// Set chain-specific override
    pub fn set_chain_override(&mut self, chain: SupportedChain, config: ChainConfig) {
        self.chain_overrides.insert(chain, config);
    }
}

/// Builder for [`AsofConfig`]
///
/// # Example
///
/// ```rust
/// use asofscan::{AsofConfigBuilder, SupportedChain};
/// use std::time::Duration;
///
/// let config = AsofConfigBuilder::new()
///     .rate_limit_delay(Duration::from_millis(500))
///     .chain_rate_limit(SupportedChain::Base, Duration::from_millis(250))
///     .build();
/// ```
pub struct AsofConfigBuilder {
    config: AsofConfig,
}

impl Default for AsofConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AsofConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: AsofConfig::minimal(),
        }
    }

    /// Start with common defaults
    ///
    /// Initializes the builder with the same defaults as [`AsofConfig::with_common_defaults`].
    pub fn with_defaults() -> Self {
        Self {
            config: AsofConfig::with_common_defaults(),
        }
    }

    /// Set the cache file location
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cache_path = path.into();
        self
    }

    /// Set global rate limit delay
    pub fn rate_limit_delay(mut self, delay: Duration) -> Self {
        self.config.rate_limit_delay = Some(delay);
        self
    }

    /// Set global RPC timeout
    pub fn rpc_timeout(mut self, timeout: Duration) -> Self {
        self.config.rpc_timeout = timeout;
        self
    }

    /// Add chain-specific configuration
    pub fn chain_config(mut self, chain: SupportedChain, config: ChainConfig) -> Self {
        self.config.set_chain_override(chain, config);
        self
    }

    /// Convenience: set rate limit delay for a specific chain
    pub fn chain_rate_limit(mut self, chain: SupportedChain, delay: Duration) -> Self {
        let existing = self.config.chain_overrides.remove(&chain).unwrap_or_default();
        self.config.set_chain_override(
            chain,
            ChainConfig {
                rate_limit_delay: Some(delay),
                ..existing
            },
        );
        self
    }

    /// Convenience: set RPC timeout for a specific chain
    pub fn chain_timeout(mut self, chain: SupportedChain, timeout: Duration) -> Self {
        let existing = self.config.chain_overrides.remove(&chain).unwrap_or_default();
        self.config.set_chain_override(
            chain,
            ChainConfig {
                rpc_timeout: Some(timeout),
                ..existing
            },
        );
        self
    }

    /// Set the market price API base URL
    pub fn price_api_url(mut self, url: impl Into<String>) -> Self {
        self.config.price_api.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the market price API key
    pub fn price_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.price_api.api_key = Some(key.into());
        self
    }

    /// Replace (or with `None`, disable) the on-chain priced special asset
    pub fn special_asset(mut self, asset: Option<SpecialAsset>) -> Self {
        self.config.special_asset = asset;
        self
    }

    /// Set the forex rates used when the live fetch fails
    pub fn fallback_rates(mut self, rates: ForexRates) -> Self {
        self.config.fallback_rates = rates;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> AsofConfig {
        self.config
    }
}
