//! Historical price resolution
//!
//! The fiat value of one unit of an asset on a calendar date, in USD, EUR and
//! CHF. Resolution is tiered:
//!
//! 1. **On-chain oracle**: the configured special asset is priced from its own
//!    `getPrice()` function, converted to fiat with live forex rates of the
//!    reference stable asset (hard-coded rates if that fetch fails).
//! 2. **Historical market price**: the market price source's quote for the
//!    exact date.
//! 3. **Current market price**: used as an approximation when tier 2 has no
//!    data for the date or is unreachable.
//!
//! Successful answers are memoized in the shared cache, so repeated queries
//! never reach the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use asofscan::{Asset, CoinGeckoClient, HistoricalPriceResolver, ProviderPriceReader, SupportedChain};
//!
//! let resolver = HistoricalPriceResolver::new(
//!     Arc::new(CoinGeckoClient::new(&config.price_api)?),
//!     Arc::new(ProviderPriceReader::new(pool.clone())),
//!     cache.clone(),
//! );
//! let quote = resolver
//!     .resolve_price_for_date_str(&Asset::native(SupportedChain::Mainnet), "2024-05-01")
//!     .await?;
//! println!("1 ETH = {} USD", quote.usd);
//! ```

mod coingecko;
mod onchain;
mod resolver;

pub use coingecko::{CoinGeckoClient, MarketPriceSource};
pub use onchain::{OnChainPriceReader, ProviderPriceReader};
pub use resolver::HistoricalPriceResolver;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::asset::Asset;
use crate::chain::SupportedChain;
use crate::config::constants::{fallback_rates, special_asset};

/// Fiat value of one unit of an asset
///
/// Currencies absent from a source response deserialize to `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceQuote {
    pub usd: f64,
    pub eur: f64,
    pub chf: f64,
}

/// Fiat value of one unit of the reference stable asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForexRates {
    pub usd: f64,
    pub eur: f64,
    pub chf: f64,
}

impl ForexRates {
    /// Approximate hard-coded rates, used when the live fetch fails
    pub fn fallback() -> Self {
        Self {
            usd: fallback_rates::USD,
            eur: fallback_rates::EUR,
            chf: fallback_rates::CHF,
        }
    }

    /// Fiat quote for an amount expressed in reference-asset units
    pub fn convert(&self, reference_units: f64) -> PriceQuote {
        PriceQuote {
            usd: reference_units * self.usd,
            eur: reference_units * self.eur,
            chf: reference_units * self.chf,
        }
    }
}

impl Default for ForexRates {
    fn default() -> Self {
        Self::fallback()
    }
}

impl From<PriceQuote> for ForexRates {
    fn from(quote: PriceQuote) -> Self {
        Self {
            usd: quote.usd,
            eur: quote.eur,
            chf: quote.chf,
        }
    }
}

/// An asset with no market listing, priced from its own on-chain function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialAsset {
    pub chain: SupportedChain,
    pub token: Address,
    /// Contract exposing `getPrice() returns (uint256)`, 18 decimals
    pub price_oracle: Address,
    /// Market coin id of the stable asset the oracle reports in
    pub reference_coin_id: String,
    /// Reference-unit price assumed if the on-chain read fails
    pub par_price: f64,
}

impl Default for SpecialAsset {
    fn default() -> Self {
        Self {
            chain: SupportedChain::Gnosis,
            token: special_asset::TOKEN,
            price_oracle: special_asset::PRICE_ORACLE,
            reference_coin_id: special_asset::REFERENCE_COIN_ID.to_string(),
            par_price: special_asset::PAR_PRICE,
        }
    }
}

impl SpecialAsset {
    pub fn matches(&self, asset: &Asset) -> bool {
        asset.chain == self.chain && asset.contract == Some(self.token)
    }
}

/// How an asset is priced, decided once per asset identity
#[derive(Debug, Clone, PartialEq)]
pub enum PricingStrategy {
    /// Read from the asset's own price function
    OnChainOracle(SpecialAsset),
    /// Historical, then current, market price
    Market,
}

impl PricingStrategy {
    pub fn for_asset(asset: &Asset, special: Option<&SpecialAsset>) -> Self {
        match special {
            Some(special) if special.matches(asset) => {
                PricingStrategy::OnChainOracle(special.clone())
            }
            _ => PricingStrategy::Market,
        }
    }
}
