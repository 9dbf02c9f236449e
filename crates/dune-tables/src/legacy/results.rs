// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Execution results pivoted into long format
//!
//! A columnar payload with `C` columns and `R` rows becomes `R * C` rows of
//! `(execution_id, query_id, row_number, column_name, column_value)`, in
//! row-major order with 1-based row numbers. Values are rendered as text:
//! strings verbatim, numbers and booleans canonically, arrays and objects as
//! compact JSON. Nulls stay null.

use std::sync::Arc;

use api_client::{ApiError, ApiTable};
use async_trait::async_trait;
use dune_api::{DuneClient, ExecutionResults, ResultRow};
use serde_json::Value;
use shared_types::{Predicate, PredicatesExt, TableResult};
use tracing::debug;

use super::{EXECUTION_ID, QUERY_ID, path_key};

/// Columns of the `results` table
pub const COLUMNS: [&str; 5] = [
    "execution_id",
    "query_id",
    "row_number",
    "column_name",
    "column_value",
];

/// `results`: pivoted results of an execution
///
/// With `execution_id` the results are fetched directly. With only
/// `query_id` the saved query is submitted, polled until it reaches a
/// terminal state and its results fetched.
#[derive(Debug, Clone)]
pub struct ResultsTable {
    client: Arc<DuneClient>,
}

impl ResultsTable {
    /// Create the table over a shared client
    pub fn new(client: Arc<DuneClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ApiTable for ResultsTable {
    fn name(&self) -> &'static str {
        "results"
    }

    fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    async fn select(&self, predicates: &[Predicate]) -> Result<TableResult, ApiError> {
        let query_id = predicates.eq_u64(QUERY_ID);

        let execution_id = match (path_key(predicates, EXECUTION_ID), query_id) {
            (Some(execution_id), _) => execution_id,
            (None, Some(query_id)) => {
                let execution_id = self.client.submit_query(query_id, None).await?;
                self.client.wait_for_completion(&execution_id).await?;
                execution_id
            }
            (None, None) => return Ok(TableResult::empty(&COLUMNS)),
        };

        let results = self.client.get_execution_results(&execution_id).await?;
        Ok(pivot(&execution_id, query_id, &results))
    }
}

/// Pivot a columnar result payload into one row per cell
///
/// Column names come from the payload metadata. When the metadata lists no
/// columns, keyed rows contribute their own keys in payload order.
pub fn pivot(execution_id: &str, query_id: Option<u64>, results: &ExecutionResults) -> TableResult {
    let Some(payload) = results.result.as_ref() else {
        debug!(execution_id, "execution has no result payload");
        return TableResult::empty(&COLUMNS);
    };

    let query_id = Value::from(results.query_id.or(query_id));
    let declared = payload.column_names();

    let cells = payload
        .rows
        .iter()
        .enumerate()
        .flat_map(|(index, row)| {
            row_columns(declared, row)
                .into_iter()
                .enumerate()
                .map(move |(position, column)| (index + 1, column, row.get(position, column)))
        })
        .map(|(row_number, column, value)| {
            [
                Value::from(execution_id),
                query_id.clone(),
                Value::from(row_number),
                Value::from(column),
                stringify(value),
            ]
        })
        .collect::<Vec<_>>();

    TableResult::from_fixed(&COLUMNS, cells)
}

fn row_columns<'a>(declared: &'a [String], row: &'a ResultRow) -> Vec<&'a str> {
    match row {
        _ if !declared.is_empty() => declared.iter().map(String::as_str).collect(),
        ResultRow::Record(record) => record.keys().map(String::as_str).collect(),
        ResultRow::Values(_) => Vec::new(),
    }
}

fn stringify(value: Option<&Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::Null,
        Some(Value::String(s)) => Value::String(s.clone()),
        Some(other) => Value::String(other.to_string()),
    }
}
