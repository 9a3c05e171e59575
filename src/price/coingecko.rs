//! Market price source backed by the CoinGecko API

use std::collections::HashMap;

use alloy_primitives::Address;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{header::ACCEPT, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, Instrument};

use super::{ForexRates, PriceQuote};
use crate::asset::Asset;
use crate::config::constants::{COINGECKO_API_KEY_HEADER, PRICE_API_DATE_FORMAT};
use crate::config::PriceApiConfig;
use crate::errors::{ConfigError, PriceSourceError};
use crate::tracing::spans;

const VS_CURRENCIES: &str = "usd,eur,chf";

/// A source of market prices for listed assets
#[async_trait]
pub trait MarketPriceSource: Send + Sync {
    /// Quote for `asset` on `date`
    ///
    /// [`PriceSourceError::NoData`] when the source has no quote for that
    /// date, e.g. before the asset was listed.
    async fn historical_price(
        &self,
        asset: &Asset,
        date: NaiveDate,
    ) -> Result<PriceQuote, PriceSourceError>;

    /// Latest quote for `asset`
    async fn current_price(&self, asset: &Asset) -> Result<PriceQuote, PriceSourceError>;

    /// Latest fiat rates of the coin `coin_id`
    async fn reference_forex_rates(&self, coin_id: &str) -> Result<ForexRates, PriceSourceError>;
}

/// CoinGecko REST client
///
/// Token contracts are addressed by (platform, contract); native coins by
/// their coin id. An optional demo API key is sent as a header.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CoinInfo {
    id: String,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    market_data: Option<MarketData>,
}

#[derive(Debug, Deserialize)]
struct MarketData {
    #[serde(default)]
    current_price: PriceQuote,
}

impl CoinGeckoClient {
    /// Build a client from the price API configuration
    pub fn new(config: &PriceApiConfig) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::invalid_value("price_api.timeout", e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, PriceSourceError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .get(&url)
            .query(query)
            .header(ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            request = request.header(COINGECKO_API_KEY_HEADER, key);
        }

        let transport = |source| PriceSourceError::Transport {
            endpoint: path.to_string(),
            source,
        };

        let (status, body) = async {
            let response = request.send().await.map_err(transport)?;
            let status = response.status();
            let body = response.bytes().await.map_err(transport)?;
            Ok::<_, PriceSourceError>((status, body))
        }
        .instrument(spans::price_api_request(path))
        .await?;

        debug!(endpoint = %path, status = status.as_u16(), bytes = body.len(), "Price API response");

        if status == StatusCode::NOT_FOUND {
            return Err(PriceSourceError::no_data(format!("{path} not found")));
        }
        if !status.is_success() {
            return Err(PriceSourceError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        serde_json::from_slice(&body).map_err(|source| PriceSourceError::Decode {
            endpoint: path.to_string(),
            source,
        })
    }

    /// Coin id for `asset`: a lookup for tokens, a constant for native coins
    async fn coin_id(&self, asset: &Asset) -> Result<String, PriceSourceError> {
        match asset.contract {
            None => asset
                .chain
                .native_coin_id()
                .map(str::to_string)
                .ok_or_else(|| {
                    PriceSourceError::no_data(format!("no native coin id for {}", asset.chain))
                }),
            Some(contract) => {
                let platform = platform(asset)?;
                let path = format!("/coins/{platform}/contract/{}", lower_hex(contract));
                let info: CoinInfo = self.get_json(&path, &[]).await?;
                Ok(info.id)
            }
        }
    }

    async fn simple_price(&self, coin_id: &str) -> Result<PriceQuote, PriceSourceError> {
        let body: HashMap<String, PriceQuote> = self
            .get_json(
                "/simple/price",
                &[("ids", coin_id), ("vs_currencies", VS_CURRENCIES)],
            )
            .await?;
        quote_for(body, coin_id)
    }
}

#[async_trait]
impl MarketPriceSource for CoinGeckoClient {
    async fn historical_price(
        &self,
        asset: &Asset,
        date: NaiveDate,
    ) -> Result<PriceQuote, PriceSourceError> {
        let id = self.coin_id(asset).await?;
        let date_param = date.format(PRICE_API_DATE_FORMAT).to_string();

        let history: HistoryResponse = self
            .get_json(
                &format!("/coins/{id}/history"),
                &[("date", date_param.as_str()), ("localization", "false")],
            )
            .await?;
        parse_history(history, &id, &date_param)
    }

    async fn current_price(&self, asset: &Asset) -> Result<PriceQuote, PriceSourceError> {
        match asset.contract {
            None => {
                let id = self.coin_id(asset).await?;
                self.simple_price(&id).await
            }
            Some(contract) => {
                let platform = platform(asset)?;
                let address = lower_hex(contract);
                let body: HashMap<String, PriceQuote> = self
                    .get_json(
                        &format!("/simple/token_price/{platform}"),
                        &[
                            ("contract_addresses", address.as_str()),
                            ("vs_currencies", VS_CURRENCIES),
                        ],
                    )
                    .await?;
                quote_for(body, &address)
            }
        }
    }

    async fn reference_forex_rates(&self, coin_id: &str) -> Result<ForexRates, PriceSourceError> {
        self.simple_price(coin_id).await.map(ForexRates::from)
    }
}

fn platform(asset: &Asset) -> Result<&'static str, PriceSourceError> {
    asset
        .chain
        .price_platform()
        .ok_or_else(|| PriceSourceError::no_data(format!("no price platform for {}", asset.chain)))
}

fn lower_hex(address: Address) -> String {
    format!("{address:#x}")
}

fn parse_history(
    history: HistoryResponse,
    id: &str,
    date: &str,
) -> Result<PriceQuote, PriceSourceError> {
    history
        .market_data
        .map(|m| m.current_price)
        .ok_or_else(|| PriceSourceError::no_data(format!("no market data for {id} on {date}")))
}

/// Picks the entry for `key`; keys in simple-price responses are lowercase
fn quote_for(
    mut body: HashMap<String, PriceQuote>,
    key: &str,
) -> Result<PriceQuote, PriceSourceError> {
    body.remove(&key.to_ascii_lowercase())
        .ok_or_else(|| PriceSourceError::no_data(format!("no current price for {key}")))
}
