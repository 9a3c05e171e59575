//! Balance reads pinned to a block

use std::future::IntoFuture;
use std::sync::Arc;

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types::{BlockId, TransactionRequest};
use alloy_sol_types::{sol, SolCall};
use tracing::{debug, Instrument};

use crate::asset::Asset;
use crate::errors::OracleError;
use crate::provider::ProviderPool;
use crate::tracing::spans;

sol! {
    function balanceOf(address account) external view returns (uint256);
}

/// Reads raw holder balances at a given block
///
/// Native assets use `eth_getBalance`; tokens use `balanceOf` via `eth_call`.
/// Amounts are returned unscaled: divide by `10^asset.decimals` to display.
#[derive(Debug, Clone)]
pub struct BalanceReader {
    pool: Arc<ProviderPool>,
}

impl BalanceReader {
    pub fn new(pool: Arc<ProviderPool>) -> Self {
        Self { pool }
    }

    /// Balance of `holder` in `asset` at `block`
    pub async fn balance_at(
        &self,
        asset: &Asset,
        holder: Address,
        block: u64,
    ) -> Result<U256, OracleError> {
        let chain = asset.chain;
        let provider = self.pool.get(chain)?;
        let at = BlockId::number(block);

        let balance = match asset.contract {
            None => provider
                .get_balance(holder)
                .block_id(at)
                .into_future()
                .instrument(spans::balance_at(chain, holder, block))
                .await
                .map_err(|e| OracleError::unavailable(format!("eth_getBalance on {chain}"), e))?,
            Some(token) => {
                let call = balanceOfCall { account: holder };
                let tx = TransactionRequest::default()
                    .with_to(token)
                    .with_input(call.abi_encode());
                let output = provider
                    .call(tx)
                    .block(at)
                    .into_future()
                    .instrument(spans::balance_at(chain, holder, block))
                    .await
                    .map_err(|e| {
                        OracleError::unavailable(format!("balanceOf({token}) on {chain}"), e)
                    })?;
                balanceOfCall::abi_decode_returns(&output).map_err(|e| {
                    OracleError::unavailable(format!("decoding balanceOf({token}) on {chain}"), e)
                })?
            }
        };

        debug!(chain = %chain, holder = %holder, block_number = block, %balance, "Read balance");
        Ok(balance)
    }
}
