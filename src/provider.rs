// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Per-chain RPC providers
//!
//! [`ProviderPool`] holds one HTTP provider per chain in a [`ChainRegistry`],
//! each built with the request timeout and pacing from [`AsofConfig`] and
//! with RPC logging enabled. The block oracle, the on-chain price reader and
//! the balance reader all share one pool.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use asofscan::{AsofConfig, ChainRegistry, ProviderPool};
//!
//! let registry = ChainRegistry::from_env()?;
//! let pool = Arc::new(ProviderPool::connect(&registry, &AsofConfig::from_env()?)?);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use alloy_network::Ethereum;
use alloy_provider::{ProviderBuilder, RootProvider};
use alloy_rpc_client::ClientBuilder;
use alloy_transport_http::Http;
use tracing::{debug, info};
use url::Url;

use crate::chain::SupportedChain;
use crate::config::AsofConfig;
use crate::errors::{ConfigError, OracleError};
use crate::registry::ChainRegistry;
use crate::transport::{LoggingLayer, RateLimitLayer};

/// HTTP provider for any supported chain
///
/// All supported chains answer the read-only calls used here with
/// Ethereum-shaped responses.
pub type HttpProvider = RootProvider<Ethereum>;

/// Type alias for a shared provider
pub type PooledProvider = Arc<HttpProvider>;

/// Build the provider for `chain` at `url`
///
/// The transport is reqwest with the chain's configured timeout, wrapped in
/// [`LoggingLayer`] and, if the chain is paced, [`RateLimitLayer`].
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if the HTTP client cannot be built.
pub fn build_provider(
    chain: SupportedChain,
    url: &Url,
    config: &AsofConfig,
) -> Result<HttpProvider, ConfigError> {
    let timeout = config.get_rpc_timeout(chain);
    let delay = config.get_rate_limit_delay(chain);

    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::invalid_value("rpc_timeout", e.to_string()))?;
    let transport = Http::with_client(http_client, url.clone());
    let is_local = transport.guess_local();

    let client = ClientBuilder::default()
        .layer(LoggingLayer::for_chain(chain))
        .layer(RateLimitLayer::from_delay(delay))
        .transport(transport, is_local);

    debug!(
        chain = %chain,
        timeout_ms = timeout.as_millis() as u64,
        delay_ms = delay.map(|d| d.as_millis() as u64),
        "Built RPC provider"
    );

    Ok(ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_client(client))
}

/// Read-only set of providers indexed by chain
#[derive(Debug, Default, Clone)]
pub struct ProviderPool {
    providers: HashMap<SupportedChain, PooledProvider>,
}

impl ProviderPool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a provider for every chain in `registry`
    ///
    /// # Errors
    ///
    /// Returns an error if any provider cannot be built.
    pub fn connect(registry: &ChainRegistry, config: &AsofConfig) -> Result<Self, ConfigError> {
        let mut pool = Self::new();
        for chain in registry.chains() {
            if let Some(url) = registry.endpoint_for(chain) {
                pool.insert(chain, build_provider(chain, url, config)?);
            }
        }
        info!(chains = pool.providers.len(), "Connected RPC providers");
        Ok(pool)
    }

    /// Add or replace the provider for `chain`
    pub fn insert(&mut self, chain: SupportedChain, provider: HttpProvider) {
        self.providers.insert(chain, Arc::new(provider));
    }

    /// The provider for `chain`
    ///
    /// # Errors
    ///
    /// [`OracleError::ChainNotConfigured`] if the pool has no provider for it.
    pub fn get(&self, chain: SupportedChain) -> Result<&PooledProvider, OracleError> {
        self.providers
            .get(&chain)
            .ok_or(OracleError::ChainNotConfigured { chain })
    }

    /// Whether the pool has a provider for `chain`
    #[must_use]
    pub fn contains(&self, chain: SupportedChain) -> bool {
        self.providers.contains_key(&chain)
    }

    /// Number of providers in the pool
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the pool is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
