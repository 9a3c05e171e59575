//! Command-line entry point

use std::sync::Arc;

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use serde::Serialize;
use tracing::info;

use crate::asset::{Asset, NATIVE_DECIMALS};
use crate::blocks::{BalanceReader, ProviderOracle, TemporalBlockResolver, UnixTimestamp};
use crate::cache::{DiskCache, MemoCache};
use crate::chain::SupportedChain;
use crate::config::constants::INPUT_DATE_FORMAT;
use crate::config::AsofConfig;
use crate::errors::BlockResolveError;
use crate::price::{
    CoinGeckoClient, HistoricalPriceResolver, PriceQuote, PricingStrategy, ProviderPriceReader,
};
use crate::provider::ProviderPool;
use crate::registry::ChainRegistry;

#[derive(Debug, Parser)]
#[command(name = "asofscan")]
#[command(version, about = "Resolve blocks and fiat prices as of a calendar date", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Highest block at or before the end of a date (UTC)
    Block {
        #[arg(long)]
        chain: SupportedChain,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
    /// USD/EUR/CHF value of one unit of an asset on a date
    Price {
        #[arg(long)]
        chain: SupportedChain,
        /// Token contract; omit for the chain's native coin
        #[arg(long)]
        token: Option<Address>,
        /// Echoed in the output only; quotes are per whole unit whatever the decimals
        #[arg(long, default_value_t = NATIVE_DECIMALS)]
        decimals: u8,
        #[arg(long)]
        date: String,
    },
    /// As-of block, raw holder balance and unit price for a date
    Report {
        #[arg(long)]
        chain: SupportedChain,
        #[arg(long)]
        token: Option<Address>,
        #[arg(long, default_value_t = NATIVE_DECIMALS)]
        decimals: u8,
        #[arg(long)]
        holder: Address,
        #[arg(long)]
        date: String,
    },
}

#[derive(Debug, Serialize)]
struct BlockOutput {
    chain: SupportedChain,
    date: String,
    as_of_timestamp: UnixTimestamp,
    block_number: u64,
}

#[derive(Debug, Serialize)]
struct PriceOutput {
    asset: Asset,
    date: String,
    strategy: &'static str,
    price: PriceQuote,
}

#[derive(Debug, Serialize)]
struct ReportOutput {
    asset: Asset,
    holder: Address,
    date: String,
    block_number: u64,
    /// Unscaled integer amount; divide by `10^decimals` to display
    raw_balance: String,
    price: PriceQuote,
}

/// Resolvers wired from the environment
struct App {
    blocks: TemporalBlockResolver,
    prices: HistoricalPriceResolver,
    balances: BalanceReader,
    cache: Arc<DiskCache>,
}

impl App {
    fn from_env() -> anyhow::Result<Self> {
        let config = AsofConfig::from_env()?;
        let registry = ChainRegistry::from_env()?;
        let pool = Arc::new(ProviderPool::connect(&registry, &config)?);

        let disk = Arc::new(DiskCache::new(config.cache_path.clone()).validate()?);
        let cache: Arc<dyn MemoCache> = disk.clone();

        let blocks =
            TemporalBlockResolver::new(Arc::new(ProviderOracle::new(pool.clone())), cache.clone());
        let prices = HistoricalPriceResolver::from_config(
            Arc::new(CoinGeckoClient::new(&config.price_api)?),
            Arc::new(ProviderPriceReader::new(pool.clone())),
            cache,
            &config,
        );

        Ok(Self {
            blocks,
            prices,
            balances: BalanceReader::new(pool),
            cache: disk,
        })
    }

    async fn execute(&self, command: Commands) -> anyhow::Result<serde_json::Value> {
        let value = match command {
            Commands::Block { chain, date } => {
                let as_of_timestamp = as_of_timestamp(&date)?;
                let block_number = self.blocks.resolve_block_for_date_str(chain, &date).await?;
                serde_json::to_value(BlockOutput {
                    chain,
                    date,
                    as_of_timestamp,
                    block_number,
                })?
            }
            Commands::Price {
                chain,
                token,
                decimals,
                date,
            } => {
                let asset = asset(chain, token, decimals);
                let strategy = match self.prices.strategy_for(&asset) {
                    PricingStrategy::OnChainOracle(_) => "on-chain-oracle",
                    PricingStrategy::Market => "market",
                };
                let price = self
                    .prices
                    .resolve_price_for_date_str(&asset, &date)
                    .await?;
                serde_json::to_value(PriceOutput {
                    asset,
                    date,
                    strategy,
                    price,
                })?
            }
            Commands::Report {
                chain,
                token,
                decimals,
                holder,
                date,
            } => {
                let asset = asset(chain, token, decimals);
                let block_number = self.blocks.resolve_block_for_date_str(chain, &date).await?;
                let balance = self
                    .balances
                    .balance_at(&asset, holder, block_number)
                    .await?;
                let price = self
                    .prices
                    .resolve_price_for_date_str(&asset, &date)
                    .await?;
                serde_json::to_value(ReportOutput {
                    asset,
                    holder,
                    date,
                    block_number,
                    raw_balance: balance.to_string(),
                    price,
                })?
            }
        };
        Ok(value)
    }
}

fn asset(chain: SupportedChain, token: Option<Address>, decimals: u8) -> Asset {
    match token {
        Some(contract) => Asset::token(chain, contract, decimals),
        None => Asset::native(chain),
    }
}

fn as_of_timestamp(date: &str) -> Result<UnixTimestamp, BlockResolveError> {
    chrono::NaiveDate::parse_from_str(date.trim(), INPUT_DATE_FORMAT)
        .map(UnixTimestamp::end_of_day)
        .map_err(|e| BlockResolveError::invalid_date(date, e.to_string()))
}

/// Main entry point for the application.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let app = App::from_env()?;
    app.cache.log_summary().await;

    let output = app.execute(cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    let stats = app.cache.stats().await;
    info!(%stats, "Cache statistics");
    Ok(())
}
