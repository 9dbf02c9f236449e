// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Execution status snapshots

use std::sync::Arc;

use api_client::{ApiError, ApiTable};
use async_trait::async_trait;
use dune_api::DuneClient;
use serde_json::Value;
use shared_types::{Predicate, PredicatesExt, TableResult};

use super::{EXECUTION_ID, QUERY_ID, path_key};

/// Columns of the `executions` table
pub const COLUMNS: [&str; 8] = [
    "execution_id",
    "query_id",
    "state",
    "submitted_at",
    "execution_started_at",
    "execution_ended_at",
    "expires_at",
    "is_execution_finished",
];

/// `executions`: status of one execution
///
/// With `execution_id` the status is fetched directly. With only `query_id`
/// a new execution of the saved query is submitted and its initial status
/// returned.
#[derive(Debug, Clone)]
pub struct ExecutionsTable {
    client: Arc<DuneClient>,
}

impl ExecutionsTable {
    /// Create the table over a shared client
    pub fn new(client: Arc<DuneClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ApiTable for ExecutionsTable {
    fn name(&self) -> &'static str {
        "executions"
    }

    fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    async fn select(&self, predicates: &[Predicate]) -> Result<TableResult, ApiError> {
        let query_id = predicates.eq_u64(QUERY_ID);
        let execution_id = match (path_key(predicates, EXECUTION_ID), query_id) {
            (Some(execution_id), _) => execution_id,
            (None, Some(query_id)) => self.client.submit_query(query_id, None).await?,
            (None, None) => return Ok(TableResult::empty(&COLUMNS)),
        };

        let status = self.client.get_execution_status(&execution_id).await?;

        Ok(TableResult::from_fixed(
            &COLUMNS,
            [[
                Value::from(status.execution_id.unwrap_or(execution_id)),
                Value::from(status.query_id.or(query_id)),
                Value::from(status.state.map(String::from)),
                Value::from(status.submitted_at),
                Value::from(status.execution_started_at),
                Value::from(status.execution_ended_at),
                Value::from(status.expires_at),
                Value::from(status.is_execution_finished),
            ]],
        ))
    }
}
