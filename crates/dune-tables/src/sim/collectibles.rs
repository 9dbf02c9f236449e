// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! NFTs held by a wallet

use std::sync::Arc;

use api_client::{ApiError, ApiTable};
use async_trait::async_trait;
use dune_api::DuneClient;
use serde_json::Value;
use shared_types::{Predicate, TableResult};

use super::required_wallet_address;

/// Columns of the `collectibles` table
pub const COLUMNS: [&str; 7] = [
    "contract_address",
    "token_id",
    "name",
    "description",
    "image_url",
    "chain",
    "collection_name",
];

/// `collectibles`: one row per NFT held by `wallet_address`
#[derive(Debug, Clone)]
pub struct CollectiblesTable {
    client: Arc<DuneClient>,
}

impl CollectiblesTable {
    /// Create the table over a shared client
    pub fn new(client: Arc<DuneClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ApiTable for CollectiblesTable {
    fn name(&self) -> &'static str {
        "collectibles"
    }

    fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    async fn select(&self, predicates: &[Predicate]) -> Result<TableResult, ApiError> {
        let Some(wallet_address) = required_wallet_address(self.name(), predicates) else {
            return Ok(TableResult::empty(&COLUMNS));
        };

        let response = self.client.collectibles(&wallet_address).await?;

        Ok(TableResult::from_fixed(
            &COLUMNS,
            response.entries().iter().map(|nft| {
                [
                    Value::from(nft.contract_address.as_deref()),
                    Value::from(nft.token_id.as_deref()),
                    Value::from(nft.name.as_deref()),
                    Value::from(nft.description.as_deref()),
                    Value::from(nft.image_url.as_deref()),
                    Value::from(nft.chain.as_deref()),
                    Value::from(nft.collection_name.as_deref()),
                ]
            }),
        ))
    }
}
