//! On-chain price reads for assets that report their own price

use std::future::IntoFuture;
use std::sync::Arc;

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use tracing::{debug, Instrument};

use crate::chain::SupportedChain;
use crate::config::constants::ORACLE_PRICE_DECIMALS;
use crate::errors::OracleError;
use crate::provider::ProviderPool;
use crate::tracing::spans;

sol! {
    function getPrice() external view returns (uint256);
}

/// Reads an asset's price from a contract exposing `getPrice()`
#[async_trait]
pub trait OnChainPriceReader: Send + Sync {
    /// Latest price reported by `oracle`, in reference-asset units
    async fn read_price(&self, chain: SupportedChain, oracle: Address)
        -> Result<f64, OracleError>;
}

/// [`OnChainPriceReader`] over the providers of a [`ProviderPool`]
#[derive(Debug, Clone)]
pub struct ProviderPriceReader {
    pool: Arc<ProviderPool>,
}

impl ProviderPriceReader {
    pub fn new(pool: Arc<ProviderPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OnChainPriceReader for ProviderPriceReader {
    async fn read_price(
        &self,
        chain: SupportedChain,
        oracle: Address,
    ) -> Result<f64, OracleError> {
        let provider = self.pool.get(chain)?;
        let operation = format!("getPrice() on {oracle} ({chain})");

        let tx = TransactionRequest::default()
            .with_to(oracle)
            .with_input(getPriceCall {}.abi_encode());
        let output = provider
            .call(tx)
            .into_future()
            .instrument(spans::read_oracle_price(chain, oracle))
            .await
            .map_err(|e| OracleError::unavailable(operation.as_str(), e))?;

        let raw = getPriceCall::abi_decode_returns(&output)
            .map_err(|e| OracleError::unavailable(operation.as_str(), e))?;
        let price = scale_fixed_point(raw, ORACLE_PRICE_DECIMALS)
            .ok_or_else(|| OracleError::malformed(operation.as_str(), format!("price {raw} out of range")))?;

        debug!(chain = %chain, oracle = %oracle, price, "Read on-chain price");
        Ok(price)
    }
}

/// `raw / 10^decimals` as a float; `None` if `raw` does not fit in 128 bits
fn scale_fixed_point(raw: U256, decimals: u8) -> Option<f64> {
    let raw = u128::try_from(raw).ok()?;
    Some(raw as f64 / 10f64.powi(i32::from(decimals)))
}
