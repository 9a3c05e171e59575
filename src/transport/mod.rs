// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transport middleware for the per-chain RPC clients.
//!
//! Both layers compose with Alloy's `ClientBuilder`:
//!
//! ```rust,ignore
//! use asofscan::transport::{LoggingLayer, RateLimitLayer};
//! use asofscan::SupportedChain;
//! use alloy_rpc_client::ClientBuilder;
//! use std::time::Duration;
//!
//! let client = ClientBuilder::default()
//!     .layer(LoggingLayer::for_chain(SupportedChain::Base))
//!     .layer(RateLimitLayer::with_min_delay(Duration::from_millis(250)))
//!     .http(rpc_url);
//! ```
//!
//! [`crate::provider::build_provider`] wires them up from [`crate::AsofConfig`].

mod logging;
mod rate_limit;

pub use logging::{LoggingLayer, LoggingService};
pub use rate_limit::{RateLimitLayer, RateLimitService};
