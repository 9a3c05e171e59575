//! Asset identity: a token contract, or a chain's native coin

use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::chain::SupportedChain;

/// Decimals of every supported chain's native coin
pub const NATIVE_DECIMALS: u8 = 18;

/// A priced or balance-checked asset on one chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub chain: SupportedChain,
    /// Token contract; `None` is the chain's native asset
    pub contract: Option<Address>,
    pub decimals: u8,
}

impl Asset {
    pub fn token(chain: SupportedChain, contract: Address, decimals: u8) -> Self {
        Self {
            chain,
            contract: Some(contract),
            decimals,
        }
    }

    pub fn native(chain: SupportedChain) -> Self {
        Self {
            chain,
            contract: None,
            decimals: NATIVE_DECIMALS,
        }
    }

    pub fn is_native(&self) -> bool {
        self.contract.is_none()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.contract {
            Some(contract) => write!(f, "{contract:#x}@{}", self.chain),
            None => write!(f, "native@{}", self.chain),
        }
    }
}
