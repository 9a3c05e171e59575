//! Chain endpoint registry
//!
//! Maps each [`SupportedChain`] to the JSON-RPC endpoint used to reach it.
//! The registry is static configuration: built once at startup, read-only
//! afterwards.
//!
//! # Example
//!
//! ```rust
//! use asofscan::{ChainRegistry, SupportedChain};
//!
//! let registry = ChainRegistry::builder()
//!     .endpoint(SupportedChain::Base, "https://mainnet.base.org")
//!     .build()
//!     .unwrap();
//!
//! assert!(registry.endpoint_for(SupportedChain::Base).is_some());
//! assert!(registry.endpoint_for(SupportedChain::Mainnet).is_none());
//! ```

use std::collections::BTreeMap;

use url::Url;

use crate::chain::SupportedChain;
use crate::config::constants::RPC_URL_TEMPLATE;
use crate::errors::ConfigError;

/// Environment variable holding the hosted RPC provider API key
pub const RPC_API_KEY_ENV: &str = "ASOFSCAN_RPC_API_KEY";

/// Prefix of the per-chain endpoint override variables (`ASOFSCAN_RPC_URL_BASE`, ...)
pub const RPC_URL_ENV_PREFIX: &str = "ASOFSCAN_RPC_URL_";

/// Name of the override variable for `chain`
pub fn endpoint_env_var(chain: SupportedChain) -> String {
    format!("{RPC_URL_ENV_PREFIX}{}", chain.env_suffix())
}

/// Read-only map from chain to RPC endpoint
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    endpoints: BTreeMap<SupportedChain, Url>,
}

impl ChainRegistry {
    /// Start building a registry in code
    pub fn builder() -> ChainRegistryBuilder {
        ChainRegistryBuilder::default()
    }

    /// Build the registry for every supported chain from the process environment
    ///
    /// Each chain uses `ASOFSCAN_RPC_URL_<CHAIN>` if set, otherwise the hosted
    /// provider template filled with `ASOFSCAN_RPC_API_KEY`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingCredential`] if the API key is absent and some
    /// chain has no override; [`ConfigError::InvalidUrl`] for a malformed URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut builder = Self::builder();
        if let Some(key) = lookup(RPC_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            builder = builder.api_key(key.trim());
        }
        for chain in SupportedChain::ALL {
            if let Some(url) = lookup(&endpoint_env_var(chain)).filter(|u| !u.trim().is_empty()) {
                builder = builder.endpoint(chain, url.trim());
            }
        }
        builder.all_chains().build()
    }

    /// The endpoint configured for `chain`, if any
    pub fn endpoint_for(&self, chain: SupportedChain) -> Option<&Url> {
        self.endpoints.get(&chain)
    }

    /// Chains with a configured endpoint, in stable order
    pub fn chains(&self) -> impl Iterator<Item = SupportedChain> + '_ {
        self.endpoints.keys().copied()
    }

    /// Number of configured chains
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether no chain is configured
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// Builder for [`ChainRegistry`]
#[derive(Debug, Default)]
pub struct ChainRegistryBuilder {
    api_key: Option<String>,
    overrides: BTreeMap<SupportedChain, String>,
    templated: Vec<SupportedChain>,
}

impl ChainRegistryBuilder {
    /// API key used to fill the hosted provider template
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Use an explicit endpoint URL for `chain`
    pub fn endpoint(mut self, chain: SupportedChain, url: impl Into<String>) -> Self {
        self.overrides.insert(chain, url.into());
        self
    }

    /// Use the hosted provider template for `chain` unless it has an explicit endpoint
    pub fn templated(mut self, chain: SupportedChain) -> Self {
        if !self.templated.contains(&chain) {
            self.templated.push(chain);
        }
        self
    }

    /// Require an endpoint for every supported chain
    pub fn all_chains(mut self) -> Self {
        for chain in SupportedChain::ALL {
            self = self.templated(chain);
        }
        self
    }

    /// Resolve and validate every endpoint
    pub fn build(self) -> Result<ChainRegistry, ConfigError> {
        let mut endpoints = BTreeMap::new();

        for (chain, raw) in &self.overrides {
            endpoints.insert(*chain, parse_url(raw, self.api_key.as_deref())?);
        }

        for chain in self.templated {
            if endpoints.contains_key(&chain) {
                continue;
            }
            let key = self
                .api_key
                .as_deref()
                .ok_or_else(|| ConfigError::missing_credential(RPC_API_KEY_ENV))?;
            let raw = RPC_URL_TEMPLATE
                .replace("{subdomain}", chain.rpc_subdomain())
                .replace("{key}", key);
            endpoints.insert(chain, parse_url(&raw, Some(key))?);
        }

        Ok(ChainRegistry { endpoints })
    }
}

fn parse_url(raw: &str, secret: Option<&str>) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        url: redact(raw, secret),
        source,
    })
}

fn redact(raw: &str, secret: Option<&str>) -> String {
    match secret {
        Some(secret) if !secret.is_empty() => raw.replace(secret, "***"),
        _ => raw.to_string(),
    }
}
