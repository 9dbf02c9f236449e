// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server errors and their HTTP mapping
//!
//! | error                         | status |
//! |-------------------------------|--------|
//! | malformed request body        | 400    |
//! | unknown projected column      | 400    |
//! | unknown table                 | 404    |
//! | remote API failure            | 502    |
//! | shutdown in progress          | 503    |
//! | configuration, startup, other | 500    |

use std::net::SocketAddr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dune_tables::QueryError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errors raised while serving
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Listener could not be bound
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        /// Requested address
        address: SocketAddr,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Listener address could not be read
    #[error("Server startup failed: {source}")]
    Startup {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Serving loop ended with an error
    #[error("Server shutdown failed: {source}")]
    Shutdown {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Request abandoned because the server is shutting down
    #[error("Server is shutting down")]
    ShuttingDown,

    /// Request body is not valid JSON for the endpoint
    #[error("Invalid JSON request: {message}")]
    JsonError {
        /// Detailed error message
        message: String,
    },

    /// Query against the table registry failed
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// HTTP status reported for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::JsonError { .. } | Self::Query(QueryError::Table(_)) => StatusCode::BAD_REQUEST,
            Self::Query(QueryError::UnknownTable(_)) => StatusCode::NOT_FOUND,
            Self::Query(QueryError::Api(api)) if api.is_upstream() => StatusCode::BAD_GATEWAY,
            Self::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config { .. }
            | Self::Bind { .. }
            | Self::Startup { .. }
            | Self::Shutdown { .. }
            | Self::Query(QueryError::Api(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));
        (status, body).into_response()
    }
}
