// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Transaction history of a wallet

use std::sync::Arc;

use api_client::{ApiError, ApiTable};
use async_trait::async_trait;
use dune_api::DuneClient;
use serde_json::Value;
use shared_types::{Predicate, TableResult};

use super::required_wallet_address;

/// Columns of the `transactions` table
pub const COLUMNS: [&str; 8] = [
    "block_number",
    "hash",
    "from_address",
    "to_address",
    "value",
    "gas_used",
    "timestamp",
    "chain",
];

/// `transactions`: one row per transaction involving `wallet_address`
#[derive(Debug, Clone)]
pub struct TransactionsTable {
    client: Arc<DuneClient>,
}

impl TransactionsTable {
    /// Create the table over a shared client
    pub fn new(client: Arc<DuneClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ApiTable for TransactionsTable {
    fn name(&self) -> &'static str {
        "transactions"
    }

    fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    async fn select(&self, predicates: &[Predicate]) -> Result<TableResult, ApiError> {
        let Some(wallet_address) = required_wallet_address(self.name(), predicates) else {
            return Ok(TableResult::empty(&COLUMNS));
        };

        let response = self.client.transactions(&wallet_address).await?;

        Ok(TableResult::from_fixed(
            &COLUMNS,
            response.transactions.iter().map(|tx| {
                [
                    Value::from(tx.block_number()),
                    Value::from(tx.hash()),
                    Value::from(tx.from_address()),
                    Value::from(tx.to_address()),
                    Value::from(tx.value()),
                    Value::from(tx.gas_used()),
                    Value::from(tx.timestamp()),
                    Value::from(tx.chain()),
                ]
            }),
        ))
    }
}
