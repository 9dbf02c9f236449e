// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Virtual tables over the Dune Analytics and Sim by Dune APIs
//!
//! Each table translates the equality predicates of a parsed query into one
//! or more REST calls and flattens the JSON response into rows of a fixed
//! schema.
//!
//! # Architecture
//!
//! - [`sim`]: wallet tables keyed by a mandatory `wallet_address`
//! - [`legacy`]: saved-query execution, trending contracts, DEX pairs and markets
//! - [`inert::InertTable`]: schema-only stand-ins for the generation not in use
//! - [`handler::DuneHandler`]: binds table names to adapters and dispatches queries
//!
//! All nine table names are always registered. Only the adapters of the
//! configured API generation reach the network.

pub mod handler;
pub mod inert;
pub mod legacy;
pub mod sim;

pub use handler::{DuneHandler, QueryError};
pub use inert::InertTable;
