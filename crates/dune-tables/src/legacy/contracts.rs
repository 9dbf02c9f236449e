// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Trending contracts

use std::sync::Arc;

use api_client::{ApiError, ApiTable};
use async_trait::async_trait;
use dune_api::DuneClient;
use serde_json::Value;
use shared_types::{Predicate, TableResult};

use super::optional_params;

/// Columns of the `contracts` table
pub const COLUMNS: [&str; 6] = [
    "address",
    "blockchain",
    "name",
    "project",
    "transaction_count",
    "user_count",
];

const FILTERS: [(&str, &str); 1] = [("blockchain", "blockchain")];

/// `contracts`: trending contracts, optionally restricted to one `blockchain`
#[derive(Debug, Clone)]
pub struct ContractsTable {
    client: Arc<DuneClient>,
}

impl ContractsTable {
    /// Create the table over a shared client
    pub fn new(client: Arc<DuneClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ApiTable for ContractsTable {
    fn name(&self) -> &'static str {
        "contracts"
    }

    fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    async fn select(&self, predicates: &[Predicate]) -> Result<TableResult, ApiError> {
        let params = optional_params(predicates, &FILTERS);
        let contracts = self.client.trending_contracts(&params).await?;

        Ok(TableResult::from_fixed(
            &COLUMNS,
            contracts.into_iter().map(|contract| {
                [
                    Value::from(contract.address),
                    Value::from(contract.blockchain),
                    Value::from(contract.name),
                    Value::from(contract.project),
                    Value::from(contract.transaction_count),
                    Value::from(contract.user_count),
                ]
            }),
        ))
    }
}
