// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Query dispatch through the table registry

use api_client::{ApiError, health};
use dune_api::ApiGeneration;
use dune_tables::QueryError;
use serde_json::json;
use shared_types::{ParsedQuery, Predicate};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

mod fixtures;
use fixtures::*;

#[tokio::test]
async fn dispatches_qualified_names_to_live_tables() {
    let mock_server = MockServer::start().await;
    mount_sim(&mock_server, "/evm/balances/0xABC", balances_response()).await;

    let handler = handler(ApiGeneration::Sim, &mock_server);
    let query = ParsedQuery::new("dune.\"Balances\"")
        .with_predicate(Predicate::equals("wallet_address", WALLET));

    let result = handler.run_query(&query).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.columns().len(), 8);
}

#[tokio::test]
async fn applies_projection_and_limit() {
    let mock_server = MockServer::start().await;
    mount_sim(&mock_server, "/evm/transactions/0xABC", transactions_response()).await;

    let handler = handler(ApiGeneration::Sim, &mock_server);
    let query = ParsedQuery::new("transactions")
        .with_predicate(Predicate::equals("wallet_address", WALLET))
        .with_columns(["hash", "block_number"])
        .with_limit(1);

    let result = handler.run_query(&query).await.unwrap();
    assert_eq!(result.columns(), ["hash", "block_number"]);
    assert_eq!(result.rows(), [vec![json!("0xh1"), json!(19_000_000)]]);
}

#[tokio::test]
async fn other_generation_tables_are_inert() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let handler = handler(ApiGeneration::Sim, &mock_server);
    for name in ["queries", "executions", "results", "contracts", "dex", "markets"] {
        let query = ParsedQuery::new(name).with_predicate(Predicate::equals("query_id", 1));
        let result = handler.run_query(&query).await.unwrap();
        assert!(result.is_empty(), "{name} returned rows");
        assert_eq!(result.columns(), handler.table(name).unwrap().columns());
    }

    let handler = fixtures::handler(ApiGeneration::Dune, &mock_server);
    let query = ParsedQuery::new("balances")
        .with_predicate(Predicate::equals("wallet_address", WALLET));
    assert!(handler.run_query(&query).await.unwrap().is_empty());
}

#[tokio::test]
async fn upstream_errors_are_reported() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dex/pairs"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&mock_server)
        .await;

    let handler = handler(ApiGeneration::Dune, &mock_server);
    let error = handler
        .run_query(&ParsedQuery::new("dex"))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        QueryError::Api(ApiError::Remote { status: 503, .. })
    ));
}

#[tokio::test]
async fn unknown_projection_makes_no_request() {
    let mock_server = MockServer::start().await;
    let handler = handler(ApiGeneration::Sim, &mock_server);

    let query = ParsedQuery::new("balances")
        .with_predicate(Predicate::equals("wallet_address", WALLET))
        .with_columns(["symbol", "ticker"]);

    assert!(matches!(
        handler.run_query(&query).await,
        Err(QueryError::Table(_))
    ));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn check_connection_uses_configured_generation() {
    let mock_server = MockServer::start().await;
    mount_dune(&mock_server, "/query/0", json!({"query_id": 0})).await;

    let status = handler(ApiGeneration::Dune, &mock_server)
        .check_connection()
        .await;
    assert!(status.success);
    assert_eq!(status.message, health::MSG_CONNECTED);
}
