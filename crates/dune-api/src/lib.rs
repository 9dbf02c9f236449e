// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP client for the Dune Analytics family of APIs
//!
//! Two API generations are supported, one per deployment:
//!
//! - **Sim by Dune**: wallet analytics (`/evm/balances`, `/evm/transactions`,
//!   `/evm/collectibles`) authenticated with `X-Sim-Api-Key`
//! - **Dune Analytics**: saved query execution, trending contracts, DEX pairs
//!   and market statistics authenticated with `X-Dune-API-Key`
//!
//! # Architecture
//!
//! - [`config::DuneConfig`]: validated connection settings built from host
//!   connection arguments
//! - [`client::DuneClient`]: the single point of outbound HTTP communication,
//!   implementing the connectivity probe, generic calls and the query
//!   execution helpers
//! - [`models`]: typed optional-field records for every response shape
//! - [`non_empty_string::NonEmptyString`]: credential validation

pub mod client;
pub mod config;
pub mod models;
pub mod non_empty_string;

pub use client::*;
pub use config::*;
pub use models::*;
pub use non_empty_string::NonEmptyString;
