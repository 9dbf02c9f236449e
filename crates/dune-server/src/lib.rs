// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP service over the Dune tables
//!
//! Exposes the table registry of [`dune_tables`] to a host query engine:
//! table discovery, query execution and a connectivity health check.
//!
//! # Module Structure
//!
//! - [`config`]: layered configuration (files, environment variables)
//! - [`error`]: server errors and their HTTP status mapping
//! - [`extractors`]: JSON body extraction with descriptive rejections
//! - [`routes`]: route table and handlers
//! - [`server`]: lifecycle, middleware and coordinated shutdown
//! - [`state`]: state shared by the handlers

pub mod config;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{DuneSettings, Environment, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::{Server, ShutdownConfig};
pub use state::{HealthCheck, ServerState};
