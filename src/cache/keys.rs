//! Cache key formats
//!
//! - block: `block:{chain_id}:{unix_ts}`
//! - market price: `price:{contract | native-{chain_id}}:{DD-MM-YYYY}`
//! - on-chain oracle price: `oracle-price:{chain_id}:{contract}:{DD-MM-YYYY}`
//!
//! Contract addresses are lowercase hex with `0x` prefix.

use alloy_primitives::Address;
use chrono::NaiveDate;

use crate::blocks::UnixTimestamp;
use crate::chain::SupportedChain;
use crate::config::constants::PRICE_API_DATE_FORMAT;

/// Key of the as-of block for `target` on `chain`
pub fn block_key(chain: SupportedChain, target: UnixTimestamp) -> String {
    format!("block:{}:{}", chain.id(), target.0)
}

/// Key of a market-sourced price quote
///
/// `None` for the contract means the chain's native asset.
///
/// Token keys carry no chain id: a contract deployed at the same address on
/// two chains (CREATE2 factories, some bridged tokens) shares one entry, and
/// whichever chain is priced first for a date answers for both.
pub fn price_key(chain: SupportedChain, contract: Option<Address>, date: NaiveDate) -> String {
    let asset = match contract {
        Some(address) => lower_hex(address),
        None => format!("native-{}", chain.id()),
    };
    format!("price:{}:{}", asset, date.format(PRICE_API_DATE_FORMAT))
}

/// Key of a quote read from the asset's own on-chain price function
pub fn oracle_price_key(chain: SupportedChain, contract: Address, date: NaiveDate) -> String {
    format!(
        "oracle-price:{}:{}:{}",
        chain.id(),
        lower_hex(contract),
        date.format(PRICE_API_DATE_FORMAT)
    )
}

fn lower_hex(address: Address) -> String {
    // Address's Display is checksummed; LowerHex is not
    format!("{address:#x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_block_key() {
        assert_eq!(
            block_key(SupportedChain::Base, UnixTimestamp(1714607999)),
            "block:8453:1714607999"
        );
    }

    #[test]
    fn test_price_key_lowercases_contract() {
        assert_eq!(
            price_key(SupportedChain::Mainnet, Some(USDC), date()),
            "price:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48:01-05-2024"
        );
    }

    #[test]
    fn test_price_key_native() {
        assert_eq!(
            price_key(SupportedChain::Polygon, None, date()),
            "price:native-137:01-05-2024"
        );
    }

    #[test]
    fn test_token_price_key_is_shared_across_chains() {
        assert_eq!(
            price_key(SupportedChain::Mainnet, Some(USDC), date()),
            price_key(SupportedChain::Arbitrum, Some(USDC), date())
        );
        assert_ne!(
            price_key(SupportedChain::Mainnet, None, date()),
            price_key(SupportedChain::Arbitrum, None, date())
        );
    }

    #[test]
    fn test_oracle_price_key() {
        assert_eq!(
            oracle_price_key(SupportedChain::Gnosis, USDC, date()),
            "oracle-price:100:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48:01-05-2024"
        );
    }
}
