// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! The closed set of EVM networks the resolvers support.
//!
//! Each chain carries the identifiers the rest of the crate needs: the
//! [`NamedChain`] and numeric id used in cache keys, the RPC subdomain used to
//! build default endpoints, and the price-platform and native-coin identifiers
//! used by the market price source.

use std::fmt;
use std::str::FromStr;

use alloy_chains::NamedChain;
use serde::{Deserialize, Serialize};

/// An EVM network supported by asofscan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedChain {
    Mainnet,
    Sepolia,
    Polygon,
    Arbitrum,
    Optimism,
    Base,
    #[serde(rename = "bsc")]
    BinanceSmartChain,
    Gnosis,
}

impl SupportedChain {
    /// All supported chains, in a stable order.
    pub const ALL: [SupportedChain; 8] = [
        SupportedChain::Mainnet,
        SupportedChain::Sepolia,
        SupportedChain::Polygon,
        SupportedChain::Arbitrum,
        SupportedChain::Optimism,
        SupportedChain::Base,
        SupportedChain::BinanceSmartChain,
        SupportedChain::Gnosis,
    ];

    /// The alloy chain this maps to.
    pub fn named(self) -> NamedChain {
        match self {
            SupportedChain::Mainnet => NamedChain::Mainnet,
            SupportedChain::Sepolia => NamedChain::Sepolia,
            SupportedChain::Polygon => NamedChain::Polygon,
            SupportedChain::Arbitrum => NamedChain::Arbitrum,
            SupportedChain::Optimism => NamedChain::Optimism,
            SupportedChain::Base => NamedChain::Base,
            SupportedChain::BinanceSmartChain => NamedChain::BinanceSmartChain,
            SupportedChain::Gnosis => NamedChain::Gnosis,
        }
    }

    /// Numeric EIP-155 chain id.
    pub fn id(self) -> u64 {
        self.named() as u64
    }

    /// Short lowercase name, also accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            SupportedChain::Mainnet => "mainnet",
            SupportedChain::Sepolia => "sepolia",
            SupportedChain::Polygon => "polygon",
            SupportedChain::Arbitrum => "arbitrum",
            SupportedChain::Optimism => "optimism",
            SupportedChain::Base => "base",
            SupportedChain::BinanceSmartChain => "bsc",
            SupportedChain::Gnosis => "gnosis",
        }
    }

    /// Subdomain of the hosted RPC provider used for default endpoints.
    pub fn rpc_subdomain(self) -> &'static str {
        match self {
            SupportedChain::Mainnet => "eth-mainnet",
            SupportedChain::Sepolia => "eth-sepolia",
            SupportedChain::Polygon => "polygon-mainnet",
            SupportedChain::Arbitrum => "arb-mainnet",
            SupportedChain::Optimism => "opt-mainnet",
            SupportedChain::Base => "base-mainnet",
            SupportedChain::BinanceSmartChain => "bnb-mainnet",
            SupportedChain::Gnosis => "gnosis-mainnet",
        }
    }

    /// Suffix of the per-chain endpoint override variable, e.g. `BASE` in
    /// `ASOFSCAN_RPC_URL_BASE`.
    pub fn env_suffix(self) -> &'static str {
        match self {
            SupportedChain::Mainnet => "MAINNET",
            SupportedChain::Sepolia => "SEPOLIA",
            SupportedChain::Polygon => "POLYGON",
            SupportedChain::Arbitrum => "ARBITRUM",
            SupportedChain::Optimism => "OPTIMISM",
            SupportedChain::Base => "BASE",
            SupportedChain::BinanceSmartChain => "BSC",
            SupportedChain::Gnosis => "GNOSIS",
        }
    }

    /// The price source's platform identifier for token contracts on this chain.
    ///
    /// Testnets have no market and therefore no platform.
    pub fn price_platform(self) -> Option<&'static str> {
        match self {
            SupportedChain::Mainnet => Some("ethereum"),
            SupportedChain::Sepolia => None,
            SupportedChain::Polygon => Some("polygon-pos"),
            SupportedChain::Arbitrum => Some("arbitrum-one"),
            SupportedChain::Optimism => Some("optimistic-ethereum"),
            SupportedChain::Base => Some("base"),
            SupportedChain::BinanceSmartChain => Some("binance-smart-chain"),
            SupportedChain::Gnosis => Some("xdai"),
        }
    }

    /// The price source's coin identifier for this chain's native asset.
    pub fn native_coin_id(self) -> Option<&'static str> {
        match self {
            SupportedChain::Mainnet
            | SupportedChain::Arbitrum
            | SupportedChain::Optimism
            | SupportedChain::Base => Some("ethereum"),
            SupportedChain::Sepolia => None,
            SupportedChain::Polygon => Some("polygon-ecosystem-token"),
            SupportedChain::BinanceSmartChain => Some("binancecoin"),
            SupportedChain::Gnosis => Some("xdai"),
        }
    }
}

impl fmt::Display for SupportedChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<NamedChain> for SupportedChain {
    type Error = NamedChain;

    fn try_from(chain: NamedChain) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|c| c.named() == chain)
            .ok_or(chain)
    }
}

impl FromStr for SupportedChain {
    type Err = String;

    /// Accepts the short name (`base`), the alloy name (`binance-smart-chain`)
    /// or the numeric chain id (`8453`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Ok(id) = s.parse::<u64>() {
            return Self::ALL
                .into_iter()
                .find(|c| c.id() == id)
                .ok_or_else(|| format!("unsupported chain id {id}"));
        }
        if let Some(chain) = Self::ALL.into_iter().find(|c| c.name() == s) {
            return Ok(chain);
        }
        let named = NamedChain::from_str(&s).map_err(|_| format!("unknown chain '{s}'"))?;
        SupportedChain::try_from(named).map_err(|c| format!("unsupported chain '{c}'"))
    }
}
