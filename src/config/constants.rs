//! Well-known addresses and constants
//!
//! This module centralizes magic constants used throughout the crate: the
//! special-cased asset that is priced on-chain, approximate forex rates used
//! when the rate fetch fails, and the date formats of the external interfaces.

use alloy_primitives::{address, Address};

/// Date format accepted from callers (`YYYY-MM-DD`)
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date format expected by the price history endpoint (`DD-MM-YYYY`)
pub const PRICE_API_DATE_FORMAT: &str = "%d-%m-%Y";

/// Public CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Header carrying the CoinGecko demo API key
pub const COINGECKO_API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Template for hosted RPC endpoints: `{subdomain}` and `{key}` are substituted
pub const RPC_URL_TEMPLATE: &str = "https://{subdomain}.g.alchemy.com/v2/{key}";

/// The asset priced by reading its on-chain price function
pub mod special_asset {
    use super::*;

    /// Reserve-backed token on Gnosis with no listing on the market price source
    ///
    /// Contract: 0x0aa1e96D2a46Ec6beB2923dE1E61Addf5F5f1dce
    pub const TOKEN: Address = address!("0aa1e96d2a46ec6beb2923de1e61addf5f5f1dce");

    /// Contract exposing `getPrice()` for [`TOKEN`] (the token itself)
    pub const PRICE_ORACLE: Address = TOKEN;

    /// Price source coin id of the reference stable asset the oracle reports in
    pub const REFERENCE_COIN_ID: &str = "usd-coin";

    /// Price in reference units assumed when the on-chain read fails
    pub const PAR_PRICE: f64 = 1.0;
}

/// Approximate value of one reference stable unit, used when the forex fetch fails
pub mod fallback_rates {
    pub const USD: f64 = 1.0;
    pub const EUR: f64 = 0.92;
    pub const CHF: f64 = 0.88;
}

/// Fixed-point scale of the on-chain price function (18 decimals)
pub const ORACLE_PRICE_DECIMALS: u8 = 18;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_asset_oracle_is_token() {
        assert_eq!(special_asset::PRICE_ORACLE, special_asset::TOKEN);
    }

    #[test]
    fn test_fallback_rates_are_positive() {
        assert!(fallback_rates::USD > 0.0);
        assert!(fallback_rates::EUR > 0.0);
        assert!(fallback_rates::CHF > 0.0);
    }

    #[test]
    fn test_date_formats() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(date.format(INPUT_DATE_FORMAT).to_string(), "2024-03-07");
        assert_eq!(date.format(PRICE_API_DATE_FORMAT).to_string(), "07-03-2024");
    }
}
