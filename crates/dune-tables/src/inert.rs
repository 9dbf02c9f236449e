// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Schema-only tables

use api_client::{ApiError, ApiTable};
use async_trait::async_trait;
use shared_types::{Predicate, TableResult};
use tracing::debug;

/// A table that declares a schema but never returns rows
///
/// Registered under the names of the API generation that is not configured,
/// so that queries against those names keep resolving.
#[derive(Debug, Clone, Copy)]
pub struct InertTable {
    name: &'static str,
    columns: &'static [&'static str],
}

impl InertTable {
    /// Inert table with the given name and schema
    pub const fn new(name: &'static str, columns: &'static [&'static str]) -> Self {
        Self { name, columns }
    }
}

#[async_trait]
impl ApiTable for InertTable {
    fn name(&self) -> &'static str {
        self.name
    }

    fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    async fn select(&self, _predicates: &[Predicate]) -> Result<TableResult, ApiError> {
        debug!(table = self.name, "table is not served by the configured API generation");
        Ok(TableResult::empty(self.columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_empty_with_schema() {
        let table = InertTable::new("dex", &["pair_address", "blockchain"]);
        let result = table
            .select(&[Predicate::equals("blockchain", "ethereum")])
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.columns(), ["pair_address", "blockchain"]);
    }
}
