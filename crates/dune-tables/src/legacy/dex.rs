// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! DEX trading pairs

use std::sync::Arc;

use api_client::{ApiError, ApiTable};
use async_trait::async_trait;
use dune_api::DuneClient;
use serde_json::Value;
use shared_types::{Predicate, TableResult};

use super::optional_params;

/// Columns of the `dex` table
pub const COLUMNS: [&str; 7] = [
    "pair_address",
    "blockchain",
    "dex_name",
    "token0_symbol",
    "token1_symbol",
    "liquidity_usd",
    "volume_24h_usd",
];

const FILTERS: [(&str, &str); 2] = [("blockchain", "blockchain"), ("dex_name", "dex_name")];

/// `dex`: trading pairs, optionally filtered by `blockchain` and `dex_name`
#[derive(Debug, Clone)]
pub struct DexTable {
    client: Arc<DuneClient>,
}

impl DexTable {
    /// Create the table over a shared client
    pub fn new(client: Arc<DuneClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ApiTable for DexTable {
    fn name(&self) -> &'static str {
        "dex"
    }

    fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    async fn select(&self, predicates: &[Predicate]) -> Result<TableResult, ApiError> {
        let params = optional_params(predicates, &FILTERS);
        let pairs = self.client.dex_pairs(&params).await?;

        Ok(TableResult::from_fixed(
            &COLUMNS,
            pairs.into_iter().map(|pair| {
                [
                    Value::from(pair.pair_address),
                    Value::from(pair.blockchain),
                    Value::from(pair.dex_name),
                    Value::from(pair.token0_symbol),
                    Value::from(pair.token1_symbol),
                    Value::from(pair.liquidity_usd),
                    Value::from(pair.volume_24h_usd),
                ]
            }),
        ))
    }
}
