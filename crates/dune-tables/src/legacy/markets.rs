// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Market statistics by market type

use std::sync::Arc;

use api_client::{ApiError, ApiTable};
use async_trait::async_trait;
use dune_api::DuneClient;
use serde_json::Value;
use shared_types::{Predicate, PredicatesExt, TableResult};
use tracing::debug;

use super::{optional_params, path_key};

/// Columns of the `markets` table
pub const COLUMNS: [&str; 5] = [
    "market_type",
    "blockchain",
    "project_name",
    "volume_24h_usd",
    "tvl_usd",
];

const MARKET_TYPE: &str = "market_type";

/// Market type queried when no `market_type` predicate is given
pub const DEFAULT_MARKET_TYPE: &str = "dex";

const FILTERS: [(&str, &str); 2] = [("blockchain", "blockchain"), ("project_name", "project")];

/// `markets`: statistics of one `market_type`, defaulting to `dex`
///
/// The market type selects the endpoint path; `blockchain` and
/// `project_name` are passed as query-string filters.
#[derive(Debug, Clone)]
pub struct MarketsTable {
    client: Arc<DuneClient>,
}

impl MarketsTable {
    /// Create the table over a shared client
    pub fn new(client: Arc<DuneClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ApiTable for MarketsTable {
    fn name(&self) -> &'static str {
        "markets"
    }

    fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    async fn select(&self, predicates: &[Predicate]) -> Result<TableResult, ApiError> {
        let market_type = match predicates.eq_string(MARKET_TYPE) {
            None => DEFAULT_MARKET_TYPE.to_string(),
            Some(_) => match path_key(predicates, MARKET_TYPE) {
                Some(market_type) => market_type,
                None => {
                    debug!(
                        table = self.name(),
                        "market_type is not a path segment, skipping remote call"
                    );
                    return Ok(TableResult::empty(&COLUMNS));
                }
            },
        };
        let params = optional_params(predicates, &FILTERS);
        let markets = self.client.markets(&market_type, &params).await?;

        Ok(TableResult::from_fixed(
            &COLUMNS,
            markets.iter().map(|market| {
                [
                    Value::from(market.market_type.as_deref().unwrap_or(&market_type)),
                    Value::from(market.blockchain.as_deref()),
                    Value::from(market.project_name()),
                    Value::from(market.volume_24h_usd),
                    Value::from(market.tvl_usd),
                ]
            }),
        ))
    }
}
