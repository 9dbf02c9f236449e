// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Token balances of a wallet across chains

use std::sync::Arc;

use api_client::{ApiError, ApiTable};
use async_trait::async_trait;
use dune_api::DuneClient;
use serde_json::Value;
use shared_types::{Predicate, TableResult};

use super::required_wallet_address;

/// Columns of the `balances` table
pub const COLUMNS: [&str; 8] = [
    "address",
    "amount",
    "chain",
    "decimals",
    "price_usd",
    "symbol",
    "value_usd",
    "wallet_address",
];

/// `balances`: one row per token held by `wallet_address`
#[derive(Debug, Clone)]
pub struct BalancesTable {
    client: Arc<DuneClient>,
}

impl BalancesTable {
    /// Create the table over a shared client
    pub fn new(client: Arc<DuneClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ApiTable for BalancesTable {
    fn name(&self) -> &'static str {
        "balances"
    }

    fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    async fn select(&self, predicates: &[Predicate]) -> Result<TableResult, ApiError> {
        let Some(wallet_address) = required_wallet_address(self.name(), predicates) else {
            return Ok(TableResult::empty(&COLUMNS));
        };

        let response = self.client.balances(&wallet_address).await?;
        // The envelope's wallet address, not the predicate value, fills the column.
        let owner = response.wallet_address;

        Ok(TableResult::from_fixed(
            &COLUMNS,
            response.balances.into_iter().map(|balance| {
                [
                    Value::from(balance.address),
                    Value::from(balance.amount),
                    Value::from(balance.chain),
                    Value::from(balance.decimals),
                    Value::from(balance.price_usd),
                    Value::from(balance.symbol),
                    Value::from(balance.value_usd),
                    Value::from(owner.clone()),
                ]
            }),
        ))
    }
}
