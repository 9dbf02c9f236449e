// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Table registry and query dispatch
//!
//! [`DuneHandler`] is the boundary with the host query engine. It is built
//! once from connection arguments, binds every table name to an adapter and
//! routes parsed queries to them. Nothing is cached between queries.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use api_client::{ApiClient, ApiError, ApiTable, ConnectionStatus};
use dune_api::{ApiGeneration, DuneClient, DuneConfig, DuneError};
use shared_types::{ParsedQuery, TableError, TableResult};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    inert::InertTable,
    legacy::{
        ContractsTable, DexTable, ExecutionsTable, MarketsTable, QueriesTable, ResultsTable,
        contracts, dex, executions, markets, queries, results,
    },
    sim::{BalancesTable, CollectiblesTable, TransactionsTable, balances, collectibles, transactions},
};

/// Errors returned by [`DuneHandler::run_query`]
#[derive(Debug, Error)]
pub enum QueryError {
    /// No table is registered under the requested name
    #[error("unknown table '{0}'")]
    UnknownTable(String),

    /// The query's projection does not fit the table schema
    #[error(transparent)]
    Table(#[from] TableError),

    /// The remote API call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Registry of the Dune tables over one shared client
#[derive(Debug, Clone)]
pub struct DuneHandler {
    client: Arc<DuneClient>,
    tables: BTreeMap<&'static str, Arc<dyn ApiTable>>,
}

impl DuneHandler {
    /// Build a handler for the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: DuneConfig) -> Result<Self, DuneError> {
        Ok(Self::with_client(DuneClient::new(config)?))
    }

    /// Build a handler from host connection arguments
    ///
    /// # Errors
    ///
    /// Returns [`DuneError::Config`] for invalid arguments
    pub fn from_connection_args(args: &HashMap<String, String>) -> Result<Self, DuneError> {
        Self::new(DuneConfig::from_connection_args(args)?)
    }

    /// Build a handler around an existing client
    pub fn with_client(client: DuneClient) -> Self {
        let client = Arc::new(client);
        let generation = client.config().generation;

        let sim: [Arc<dyn ApiTable>; 3] = match generation {
            ApiGeneration::Sim => [
                Arc::new(BalancesTable::new(Arc::clone(&client))),
                Arc::new(TransactionsTable::new(Arc::clone(&client))),
                Arc::new(CollectiblesTable::new(Arc::clone(&client))),
            ],
            ApiGeneration::Dune => [
                Arc::new(InertTable::new("balances", &balances::COLUMNS)),
                Arc::new(InertTable::new("transactions", &transactions::COLUMNS)),
                Arc::new(InertTable::new("collectibles", &collectibles::COLUMNS)),
            ],
        };

        let legacy: [Arc<dyn ApiTable>; 6] = match generation {
            ApiGeneration::Dune => [
                Arc::new(QueriesTable::new(Arc::clone(&client))),
                Arc::new(ExecutionsTable::new(Arc::clone(&client))),
                Arc::new(ResultsTable::new(Arc::clone(&client))),
                Arc::new(ContractsTable::new(Arc::clone(&client))),
                Arc::new(DexTable::new(Arc::clone(&client))),
                Arc::new(MarketsTable::new(Arc::clone(&client))),
            ],
            ApiGeneration::Sim => [
                Arc::new(InertTable::new("queries", &queries::COLUMNS)),
                Arc::new(InertTable::new("executions", &executions::COLUMNS)),
                Arc::new(InertTable::new("results", &results::COLUMNS)),
                Arc::new(InertTable::new("contracts", &contracts::COLUMNS)),
                Arc::new(InertTable::new("dex", &dex::COLUMNS)),
                Arc::new(InertTable::new("markets", &markets::COLUMNS)),
            ],
        };

        let tables = sim
            .into_iter()
            .chain(legacy)
            .map(|table| (table.name(), table))
            .collect();

        info!(%generation, base_url = client.config().base_url(), "registered Dune tables");
        Self { client, tables }
    }

    /// API generation the live tables target
    pub fn generation(&self) -> ApiGeneration {
        self.client.config().generation
    }

    /// Probe the remote API with the configured credential
    pub async fn check_connection(&self) -> ConnectionStatus {
        self.client.probe().await
    }

    /// Registered table names, sorted
    pub fn table_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tables.keys().copied()
    }

    /// Registered tables, sorted by name
    pub fn tables(&self) -> impl Iterator<Item = &Arc<dyn ApiTable>> + '_ {
        self.tables.values()
    }

    /// Look up a table by name, ignoring case and any qualifier
    pub fn table(&self, name: &str) -> Option<&Arc<dyn ApiTable>> {
        let resolved = ParsedQuery::new(name).table_name();
        self.tables.get(resolved.as_str())
    }

    /// Run a parsed query against its table
    ///
    /// Projection columns are validated before any remote call. After the
    /// table answered, the projection and `limit` are applied. An empty
    /// projection selects every column.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownTable`] for unregistered names,
    /// [`QueryError::Table`] for unknown projected columns and
    /// [`QueryError::Api`] when the remote call fails
    pub async fn run_query(&self, query: &ParsedQuery) -> Result<TableResult, QueryError> {
        let name = query.table_name();
        let table = self
            .tables
            .get(name.as_str())
            .ok_or_else(|| QueryError::UnknownTable(query.table.clone()))?;

        let projection = query.columns.as_deref().filter(|columns| !columns.is_empty());
        if let Some(columns) = projection {
            if let Some(unknown) = columns
                .iter()
                .find(|column| !table.columns().contains(&column.as_str()))
            {
                return Err(TableError::UnknownColumn {
                    column: unknown.clone(),
                }
                .into());
            }
        }

        debug!(
            table = %name,
            predicates = query.predicates.len(),
            "dispatching query"
        );
        let mut result = table.select(&query.predicates).await?;

        if let Some(columns) = projection {
            result = result.project(columns)?;
        }
        if let Some(limit) = query.limit {
            result = result.truncate(limit);
        }
        Ok(result)
    }
}
