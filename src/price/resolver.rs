// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tiered historical price resolver

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn, Instrument, Span};

use super::{
    ForexRates, MarketPriceSource, OnChainPriceReader, PriceQuote, PricingStrategy, SpecialAsset,
};
use crate::asset::Asset;
use crate::cache::{keys, MemoCache, MemoCacheExt};
use crate::config::constants::INPUT_DATE_FORMAT;
use crate::config::AsofConfig;
use crate::errors::PriceError;
use crate::tracing::spans;

/// Resolves the fiat value of one unit of an asset on a date
///
/// See the [module documentation](super) for the tiers.
pub struct HistoricalPriceResolver {
    market: Arc<dyn MarketPriceSource>,
    onchain: Arc<dyn OnChainPriceReader>,
    cache: Arc<dyn MemoCache>,
    special_asset: Option<SpecialAsset>,
    fallback_rates: ForexRates,
}

impl HistoricalPriceResolver {
    /// Resolver with the built-in special asset and fallback rates
    pub fn new(
        market: Arc<dyn MarketPriceSource>,
        onchain: Arc<dyn OnChainPriceReader>,
        cache: Arc<dyn MemoCache>,
    ) -> Self {
        Self {
            market,
            onchain,
            cache,
            special_asset: Some(SpecialAsset::default()),
            fallback_rates: ForexRates::fallback(),
        }
    }

    /// Resolver using the special asset and fallback rates from `config`
    pub fn from_config(
        market: Arc<dyn MarketPriceSource>,
        onchain: Arc<dyn OnChainPriceReader>,
        cache: Arc<dyn MemoCache>,
        config: &AsofConfig,
    ) -> Self {
        Self::new(market, onchain, cache)
            .with_special_asset(config.special_asset.clone())
            .with_fallback_rates(config.fallback_rates)
    }

    pub fn with_special_asset(mut self, special_asset: Option<SpecialAsset>) -> Self {
        self.special_asset = special_asset;
        self
    }

    pub fn with_fallback_rates(mut self, rates: ForexRates) -> Self {
        self.fallback_rates = rates;
        self
    }

    /// How `asset` will be priced
    pub fn strategy_for(&self, asset: &Asset) -> PricingStrategy {
        PricingStrategy::for_asset(asset, self.special_asset.as_ref())
    }

    /// Price of one unit of `asset` on `date`
    ///
    /// # Errors
    ///
    /// - [`PriceError::UnsupportedChain`] if the chain has no market mapping
    /// - [`PriceError::PriceUnavailable`] if every market tier failed
    pub async fn resolve_price(
        &self,
        asset: &Asset,
        date: NaiveDate,
    ) -> Result<PriceQuote, PriceError> {
        let label = asset.to_string();
        let span = spans::resolve_price(asset.chain, &label, date);

        async move {
            match self.strategy_for(asset) {
                PricingStrategy::OnChainOracle(special) => {
                    Ok(self.resolve_on_chain(&special, date).await)
                }
                PricingStrategy::Market => self.resolve_market(asset, &label, date).await,
            }
        }
        .instrument(span)
        .await
    }

    /// Price for a `YYYY-MM-DD` date string
    ///
    /// # Errors
    ///
    /// [`PriceError::InvalidDate`] if the string does not parse.
    pub async fn resolve_price_for_date_str(
        &self,
        asset: &Asset,
        date: &str,
    ) -> Result<PriceQuote, PriceError> {
        let parsed = NaiveDate::parse_from_str(date.trim(), INPUT_DATE_FORMAT).map_err(|e| {
            PriceError::InvalidDate {
                input: date.to_string(),
                reason: e.to_string(),
            }
        })?;
        self.resolve_price(asset, parsed).await
    }

    /// Tier 1: never fails; falls back to par price and hard-coded rates
    async fn resolve_on_chain(&self, special: &SpecialAsset, date: NaiveDate) -> PriceQuote {
        Span::current().record("tier", "oracle");
        let key = keys::oracle_price_key(special.chain, special.token, date);

        if let Some(quote) = self.cache.get_json::<PriceQuote>(&key).await {
            info!(key = %key, cache = %self.cache.name(), cached = true, "Retrieved oracle price from cache");
            return quote;
        }

        let mut degraded = false;

        let reference_price = match self
            .onchain
            .read_price(special.chain, special.price_oracle)
            .await
        {
            Ok(price) => price,
            Err(e) => {
                warn!(error = %e, par_price = special.par_price, "On-chain price read failed, assuming par");
                degraded = true;
                special.par_price
            }
        };

        let rates = match self
            .market
            .reference_forex_rates(&special.reference_coin_id)
            .await
        {
            Ok(rates) => rates,
            Err(e) => {
                warn!(error = %e, "Forex rate fetch failed, using fallback rates");
                degraded = true;
                self.fallback_rates
            }
        };

        let quote = rates.convert(reference_price);

        if degraded {
            info!(reference_price, usd = quote.usd, "Resolved degraded oracle price (not cached)");
        } else {
            if let Err(e) = self.cache.put_json(&key, &quote).await {
                warn!(key = %key, error = %e, "Failed to cache oracle price");
            }
            info!(reference_price, usd = quote.usd, "Resolved oracle price");
        }
        quote
    }

    /// Tiers 2 and 3
    async fn resolve_market(
        &self,
        asset: &Asset,
        label: &str,
        date: NaiveDate,
    ) -> Result<PriceQuote, PriceError> {
        let chain = asset.chain;
        let mapped = match asset.contract {
            Some(_) => chain.price_platform().is_some(),
            None => chain.native_coin_id().is_some(),
        };
        if !mapped {
            return Err(PriceError::UnsupportedChain { chain });
        }

        let key = keys::price_key(chain, asset.contract, date);
        if let Some(quote) = self.cache.get_json::<PriceQuote>(&key).await {
            info!(key = %key, cache = %self.cache.name(), cached = true, "Retrieved price from cache");
            return Ok(quote);
        }

        Span::current().record("tier", "historical");
        let date_label = date.format(INPUT_DATE_FORMAT).to_string();
        let quote = match self.market.historical_price(asset, date).await {
            Ok(quote) => quote,
            Err(historical_err)
                if historical_err.is_no_data() || historical_err.is_unreachable() =>
            {
                warn!(
                    error = %historical_err,
                    no_data = historical_err.is_no_data(),
                    "Historical price unavailable, falling back to current price"
                );
                Span::current().record("tier", "current");
                self.market
                    .current_price(asset)
                    .await
                    .map_err(|e| PriceError::unavailable(label, date_label, e))?
            }
            // rejected or undecodable answers never fall through to the current price
            Err(historical_err) => {
                warn!(error = %historical_err, "Historical price request rejected");
                return Err(PriceError::unavailable(label, date_label, historical_err));
            }
        };

        if let Err(e) = self.cache.put_json(&key, &quote).await {
            warn!(key = %key, error = %e, "Failed to cache price");
        }
        info!(usd = quote.usd, eur = quote.eur, chf = quote.chf, "Resolved market price");
        Ok(quote)
    }
}
