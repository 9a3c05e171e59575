//! Resolve what an EVM chain looked like as of a calendar date
//!
//! Two independent resolvers share one memoization cache:
//!
//! - [`TemporalBlockResolver`] finds the highest block whose timestamp does
//!   not exceed a target instant.
//! - [`HistoricalPriceResolver`] finds the USD/EUR/CHF value of one unit of an
//!   asset on a date.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use asofscan::*;
//!
//! let config = AsofConfig::from_env()?;
//! let pool = Arc::new(ProviderPool::connect(&ChainRegistry::from_env()?, &config)?);
//! let cache: Arc<dyn MemoCache> = Arc::new(DiskCache::new(&config.cache_path).validate()?);
//!
//! let blocks = TemporalBlockResolver::new(Arc::new(ProviderOracle::new(pool.clone())), cache.clone());
//! let block = blocks
//!     .resolve_block_for_date_str(SupportedChain::Base, "2024-05-01")
//!     .await?;
//! ```

pub mod asset;
pub mod blocks;
pub mod bootstrap;
pub mod cache;
pub mod chain;
pub mod config;
pub mod errors;
pub mod price;
pub mod provider;
pub mod registry;
pub(crate) mod tracing;
pub mod transport;

pub use asset::Asset;
pub use blocks::{
    BalanceReader, BlockTimestampOracle, ProviderOracle, ResolvedBlock, TemporalBlockResolver,
    UnixTimestamp,
};
pub use cache::{CacheStats, DiskCache, MemoCache, MemoCacheExt, MemoryCache, NoOpCache};
pub use chain::SupportedChain;
pub use config::{AsofConfig, AsofConfigBuilder, ChainConfig, PriceApiConfig};
pub use errors::*;
pub use price::{
    CoinGeckoClient, ForexRates, HistoricalPriceResolver, MarketPriceSource, OnChainPriceReader,
    PriceQuote, PricingStrategy, ProviderPriceReader, SpecialAsset,
};
pub use provider::{build_provider, HttpProvider, PooledProvider, ProviderPool};
pub use registry::{ChainRegistry, ChainRegistryBuilder};
pub use transport::{LoggingLayer, RateLimitLayer};
