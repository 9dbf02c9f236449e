// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Adapter contract and error types for remote analytics APIs
//!
//! This crate holds the abstractions shared between the HTTP client layer and
//! the table adapters built on top of it.
//!
//! # Core Abstractions
//!
//! - **`ApiClient` Trait**: connectivity probe implemented by every remote client
//! - **`ApiTable` Trait**: a fixed-schema virtual table answering `select(predicates)`
//! - **Connection Status**: the `{success, message}` outcome of a probe
//! - **Error Handling**: `ApiError` covering configuration, authentication,
//!   transport and remote failures

use std::fmt::Debug;

use async_trait::async_trait;
use shared_types::{Predicate, TableResult};
use thiserror::Error;

pub mod health;
pub mod types;

pub use health::*;
pub use types::*;

/// Generic trait for remote API clients
pub trait ApiClient: Send + Sync {
    /// Check that the remote API is reachable and accepts the configured credential
    ///
    /// Never fails: every outcome, including transport errors, is reported
    /// through the returned status.
    fn probe(&self) -> impl Future<Output = ConnectionStatus> + Send;

    /// Get the name/identifier of this API client
    fn name(&self) -> &'static str;
}

/// A virtual table backed by a remote endpoint
///
/// Implementations always return a result whose columns equal
/// [`ApiTable::columns`], including when no rows were produced. Absent or
/// malformed predicates degrade to an empty result instead of failing.
#[async_trait]
pub trait ApiTable: Send + Sync + Debug {
    /// Table name as exposed to the query engine
    fn name(&self) -> &'static str;

    /// Ordered column names of the table
    fn columns(&self) -> &'static [&'static str];

    /// Run the table's remote lookup for the given predicates
    async fn select(&self, predicates: &[Predicate]) -> Result<TableResult, ApiError>;
}

/// Common errors that can occur when working with API clients
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ApiError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {message}")]
    Http { message: String },

    /// Authentication failed
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Invalid response format
    #[error("Invalid response format: {message}")]
    InvalidResponse { message: String },

    /// Remote API answered with a non-success status
    #[error("Remote API returned status {status}: {body}")]
    Remote { status: u16, body: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Network timeout
    #[error("Request timeout after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    /// A submitted query execution did not complete successfully
    #[error("Execution {execution_id} ended in state {state}")]
    Execution { execution_id: String, state: String },
}

impl ApiError {
    /// Whether the error originates from the remote side rather than local configuration
    pub fn is_upstream(&self) -> bool {
        !matches!(self, Self::Configuration { .. })
    }
}
