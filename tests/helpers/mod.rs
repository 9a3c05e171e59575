// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for asofscan integration tests
//!
//! Mock implementations of the oracle and price-source traits, so resolvers
//! can be exercised without a node or a price API.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alloy_primitives::Address;
use asofscan::{
    Asset, BlockTimestampOracle, ForexRates, MarketPriceSource, OnChainPriceReader, OracleError,
    PriceQuote, PriceSourceError, SupportedChain, UnixTimestamp,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Genesis-ish timestamp of block 1 in [`MockOracle::linear`]
pub const BASE_TS: i64 = 1_600_000_000;

/// Seconds between blocks in [`MockOracle::linear`]
pub const BLOCK_TIME: i64 = 12;

/// Mock BlockTimestampOracle with a fixed height and a timestamp function
///
/// Counts every call so tests can assert on probe counts and cache hits.
///
/// # Example
///
/// ```rust,ignore
/// let oracle = Arc::new(MockOracle::linear(1_000_000));
/// let resolver = TemporalBlockResolver::new(oracle.clone(), cache);
/// resolver.resolve_block(chain, oracle.ts(500_000)).await?;
/// assert!(oracle.timestamp_calls() <= 20);
/// ```
pub struct MockOracle {
    height: u64,
    timestamp_fn: Box<dyn Fn(u64) -> i64 + Send + Sync>,
    fail_at: Option<u64>,
    delay: Option<Duration>,
    height_calls: AtomicUsize,
    timestamp_calls: AtomicUsize,
}

impl MockOracle {
    /// `height` blocks, one every [`BLOCK_TIME`] seconds from [`BASE_TS`]
    pub fn linear(height: u64) -> Self {
        Self::with_timestamps(height, |n| BASE_TS + BLOCK_TIME * (n as i64 - 1))
    }

    pub fn with_timestamps<F>(height: u64, timestamp_fn: F) -> Self
    where
        F: Fn(u64) -> i64 + Send + Sync + 'static,
    {
        Self {
            height,
            timestamp_fn: Box::new(timestamp_fn),
            fail_at: None,
            delay: None,
            height_calls: AtomicUsize::new(0),
            timestamp_calls: AtomicUsize::new(0),
        }
    }

    /// Make `timestamp_of(block)` fail as if the node were unreachable
    pub fn failing_at(mut self, block: u64) -> Self {
        self.fail_at = Some(block);
        self
    }

    /// Sleep before answering, so concurrent callers interleave
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Timestamp of `block` as the resolver sees it
    pub fn ts(&self, block: u64) -> UnixTimestamp {
        UnixTimestamp((self.timestamp_fn)(block))
    }

    pub fn height_calls(&self) -> usize {
        self.height_calls.load(Ordering::SeqCst)
    }

    pub fn timestamp_calls(&self) -> usize {
        self.timestamp_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.height_calls() + self.timestamp_calls()
    }
}

#[async_trait]
impl BlockTimestampOracle for MockOracle {
    async fn current_height(&self, _chain: SupportedChain) -> Result<u64, OracleError> {
        self.height_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.height)
    }

    async fn timestamp_of(
        &self,
        _chain: SupportedChain,
        block: u64,
    ) -> Result<UnixTimestamp, OracleError> {
        self.timestamp_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_at == Some(block) {
            return Err(OracleError::malformed(
                format!("eth_getBlockByNumber({block})"),
                "connection refused",
            ));
        }
        if block == 0 || block > self.height {
            return Err(OracleError::BlockNotFound {
                block_number: block,
            });
        }
        Ok(self.ts(block))
    }
}

/// Mock MarketPriceSource; a tier configured with `None` fails
///
/// A missing historical quote fails with `NoData` unless
/// [`with_historical_error`](Self::with_historical_error) says otherwise; a
/// missing current quote or forex rate fails with an HTTP 503 status error.
#[derive(Default)]
pub struct MockMarketSource {
    historical: Option<PriceQuote>,
    historical_error: Option<fn() -> PriceSourceError>,
    current: Option<PriceQuote>,
    forex: Option<ForexRates>,
    historical_calls: AtomicUsize,
    current_calls: AtomicUsize,
    forex_calls: AtomicUsize,
}

impl MockMarketSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_historical(mut self, quote: PriceQuote) -> Self {
        self.historical = Some(quote);
        self
    }

    /// Fail the historical tier with a fresh error from `make`
    pub fn with_historical_error(mut self, make: fn() -> PriceSourceError) -> Self {
        self.historical_error = Some(make);
        self
    }

    pub fn with_current(mut self, quote: PriceQuote) -> Self {
        self.current = Some(quote);
        self
    }

    pub fn with_forex(mut self, rates: ForexRates) -> Self {
        self.forex = Some(rates);
        self
    }

    pub fn historical_calls(&self) -> usize {
        self.historical_calls.load(Ordering::SeqCst)
    }

    pub fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    pub fn forex_calls(&self) -> usize {
        self.forex_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.historical_calls() + self.current_calls() + self.forex_calls()
    }
}

/// `Transport` error for a request that never left the client
pub fn unreachable_error() -> PriceSourceError {
    let source = reqwest::Client::new()
        .get("not a url")
        .build()
        .expect_err("relative URL is rejected by the builder");
    PriceSourceError::Transport {
        endpoint: "/coins/usd-coin/history".to_string(),
        source,
    }
}

/// `Status` error the way a rate-limited API answers
pub fn rate_limited_error() -> PriceSourceError {
    PriceSourceError::Status {
        endpoint: "/coins/usd-coin/history".to_string(),
        status: 429,
    }
}

/// `Decode` error for a body that is not a price document
pub fn garbled_error() -> PriceSourceError {
    let source = serde_json::from_str::<serde_json::Value>("<html>")
        .expect_err("HTML is not JSON");
    PriceSourceError::Decode {
        endpoint: "/coins/usd-coin/history".to_string(),
        source,
    }
}

fn unavailable(endpoint: &str) -> PriceSourceError {
    PriceSourceError::Status {
        endpoint: endpoint.to_string(),
        status: 503,
    }
}

#[async_trait]
impl MarketPriceSource for MockMarketSource {
    async fn historical_price(
        &self,
        asset: &Asset,
        date: NaiveDate,
    ) -> Result<PriceQuote, PriceSourceError> {
        self.historical_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(make) = self.historical_error {
            return Err(make());
        }
        self.historical
            .ok_or_else(|| PriceSourceError::no_data(format!("no market data for {asset} on {date}")))
    }

    async fn current_price(&self, _asset: &Asset) -> Result<PriceQuote, PriceSourceError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        self.current.ok_or_else(|| unavailable("/simple/price"))
    }

    async fn reference_forex_rates(&self, _coin_id: &str) -> Result<ForexRates, PriceSourceError> {
        self.forex_calls.fetch_add(1, Ordering::SeqCst);
        self.forex.ok_or_else(|| unavailable("/simple/price"))
    }
}

/// Mock OnChainPriceReader returning a fixed price, or failing with `None`
pub struct MockPriceReader {
    price: Option<f64>,
    calls: AtomicUsize,
}

impl MockPriceReader {
    pub fn returning(price: f64) -> Self {
        Self {
            price: Some(price),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            price: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OnChainPriceReader for MockPriceReader {
    async fn read_price(
        &self,
        chain: SupportedChain,
        oracle: Address,
    ) -> Result<f64, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.price.ok_or_else(|| {
            OracleError::malformed(format!("getPrice() on {oracle} ({chain})"), "execution reverted")
        })
    }
}

/// Shorthand for a three-currency quote
pub fn quote(usd: f64, eur: f64, chf: f64) -> PriceQuote {
    PriceQuote { usd, eur, chf }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

