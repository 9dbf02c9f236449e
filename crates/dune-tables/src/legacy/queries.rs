// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Saved query metadata

use std::sync::Arc;

use api_client::{ApiError, ApiTable};
use async_trait::async_trait;
use dune_api::DuneClient;
use serde_json::Value;
use shared_types::{Predicate, PredicatesExt, TableResult};
use tracing::warn;

use super::QUERY_ID;

/// Columns of the `queries` table
pub const COLUMNS: [&str; 7] = [
    "query_id",
    "name",
    "description",
    "owner",
    "query_sql",
    "is_private",
    "is_archived",
];

/// `queries`: metadata of the saved query named by `query_id`
///
/// Lookup failures of any kind yield an empty result.
#[derive(Debug, Clone)]
pub struct QueriesTable {
    client: Arc<DuneClient>,
}

impl QueriesTable {
    /// Create the table over a shared client
    pub fn new(client: Arc<DuneClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ApiTable for QueriesTable {
    fn name(&self) -> &'static str {
        "queries"
    }

    fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    async fn select(&self, predicates: &[Predicate]) -> Result<TableResult, ApiError> {
        let Some(query_id) = predicates.eq_u64(QUERY_ID) else {
            return Ok(TableResult::empty(&COLUMNS));
        };

        let query = match self.client.get_query(query_id).await {
            Ok(query) => query,
            Err(error) => {
                warn!(query_id, %error, "query metadata lookup failed, treating as not found");
                return Ok(TableResult::empty(&COLUMNS));
            }
        };

        Ok(TableResult::from_fixed(
            &COLUMNS,
            [[
                Value::from(query.query_id.unwrap_or(query_id)),
                Value::from(query.name),
                Value::from(query.description),
                Value::from(query.owner),
                Value::from(query.query_sql),
                Value::from(query.is_private),
                Value::from(query.is_archived),
            ]],
        ))
    }
}
