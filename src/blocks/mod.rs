// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Temporal block resolution.
//!
//! This module provides:
//! - [`BlockTimestampOracle`]: the chain tip and per-block timestamps, over RPC
//! - [`TemporalBlockResolver`]: the last block at or before an instant, memoized
//! - [`BalanceReader`]: raw balances pinned to a resolved block

mod balance;
mod oracle;
mod resolver;

pub use balance::BalanceReader;
pub use oracle::{BlockTimestampOracle, ProviderOracle};
pub use resolver::{ResolvedBlock, TemporalBlockResolver};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Seconds since the Unix epoch, UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnixTimestamp(pub i64);

impl UnixTimestamp {
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }

    /// Creates a UnixTimestamp from a block header's `u64` timestamp
    pub fn from_u64(ts: u64) -> Self {
        Self(i64::try_from(ts).unwrap_or(i64::MAX))
    }

    /// The last second of `date` in UTC (`23:59:59`)
    ///
    /// This is the instant a calendar date stands for: the ledger "as of"
    /// a date is its state at the end of that day.
    pub fn end_of_day(date: NaiveDate) -> Self {
        let midnight = date.and_time(chrono::NaiveTime::MIN).and_utc();
        Self(midnight.timestamp() + 86_399)
    }
}

impl std::fmt::Display for UnixTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
