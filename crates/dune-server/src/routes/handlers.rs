// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP request handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use shared_types::{ParsedQuery, TableResult};
use tracing::{debug, info};

use crate::{
    error::{ServerError, ServerResult},
    extractors::JsonExtractor,
    state::{HealthCheck, ServerState},
};

/// `GET /health`: 200 when the remote API accepts the credential, 503 otherwise
pub async fn health_handler(State(state): State<ServerState>) -> (StatusCode, Json<HealthCheck>) {
    let health = state.health_check().await;
    let status = if health.success {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health))
}

/// Schema of one registered table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,
    /// Columns in result order
    pub columns: Vec<String>,
}

/// Body of `GET /v1/tables`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablesResponse {
    /// Tables sorted by name
    pub tables: Vec<TableSchema>,
}

/// `GET /v1/tables`
pub async fn tables_handler(State(state): State<ServerState>) -> Json<TablesResponse> {
    let tables = state
        .handler()
        .tables()
        .map(|table| TableSchema {
            name: table.name().to_string(),
            columns: table.columns().iter().map(ToString::to_string).collect(),
        })
        .collect();
    Json(TablesResponse { tables })
}

/// `POST /v1/query`
///
/// The query is abandoned with 503 when the server starts shutting down
/// before the remote API answered.
pub async fn query_handler(
    State(state): State<ServerState>,
    JsonExtractor(query): JsonExtractor<ParsedQuery>,
) -> ServerResult<Json<TableResult>> {
    debug!(table = %query.table, predicates = query.predicates.len(), "query received");

    let result = tokio::select! {
        result = state.handler().run_query(&query) => result?,
        () = state.cancellation_token.cancelled() => return Err(ServerError::ShuttingDown),
    };

    info!(table = %query.table, rows = result.len(), "query answered");
    Ok(Json(result))
}
