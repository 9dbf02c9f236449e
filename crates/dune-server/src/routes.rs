// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Route table
//!
//! - `GET /health`: connectivity probe of the configured API generation
//! - `GET /v1/tables`: registered tables and their columns
//! - `POST /v1/query`: run a parsed query

pub mod handlers;

use axum::{
    Router,
    routing::{get, post},
};
use handlers::{health_handler, query_handler, tables_handler};

use crate::state::ServerState;

/// Application routes
pub fn create_routes() -> Router<ServerState> {
    let v1 = Router::new()
        .route("/tables", get(tables_handler))
        .route("/query", post(query_handler));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", v1)
}
