// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests of the HTTP service against a mocked remote API

use dune_api::ApiGeneration;
use dune_server::{DuneSettings, HealthCheck};
use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

use fixtures::*;

#[tokio::test]
async fn health_reports_connected_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query/0"))
        .and(header("X-Dune-API-Key", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = start(settings(ApiGeneration::Dune, &upstream)).await;
    let response = reqwest::get(server.url("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let health: HealthCheck = response.json().await.unwrap();
    assert!(health.success);
    assert_eq!(health.message, "Connection established successfully");
    assert_eq!(health.generation, ApiGeneration::Dune);
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn health_is_unavailable_with_rejected_key() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&upstream)
        .await;

    let server = start(settings(ApiGeneration::Sim, &upstream)).await;
    let response = reqwest::get(server.url("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let health: HealthCheck = response.json().await.unwrap();
    assert!(!health.success);
    assert_eq!(health.message, "Connection failed: Invalid API key");
}

#[tokio::test]
async fn health_without_key_makes_no_request() {
    let upstream = MockServer::start().await;
    let server = start(DuneSettings {
        api_key: None,
        ..settings(ApiGeneration::Sim, &upstream)
    })
    .await;

    let response = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let health: HealthCheck = response.json().await.unwrap();
    assert_eq!(health.message, "Connection failed: API key is required");
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn lists_all_tables() {
    let upstream = MockServer::start().await;
    let server = start(settings(ApiGeneration::Sim, &upstream)).await;

    let body: Value = reqwest::get(server.url("/v1/tables"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let tables = body["tables"].as_array().unwrap();
    let names: Vec<_> = tables.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        [
            "balances",
            "collectibles",
            "contracts",
            "dex",
            "executions",
            "markets",
            "queries",
            "results",
            "transactions"
        ]
    );
    assert_eq!(
        tables[0]["columns"],
        json!([
            "address",
            "amount",
            "chain",
            "decimals",
            "price_usd",
            "symbol",
            "value_usd",
            "wallet_address"
        ])
    );
}

#[tokio::test]
async fn query_round_trip() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/evm/balances/0xABC"))
        .and(header("X-Sim-Api-Key", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(balances_response()))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = start(settings(ApiGeneration::Sim, &upstream)).await;
    let response = reqwest::Client::new()
        .post(server.url("/v1/query"))
        .json(&json!({
            "table": "dune.balances",
            "predicates": [{"op": "=", "column": "wallet_address", "value": WALLET}],
            "columns": ["symbol", "value_usd"],
            "limit": 1
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({"columns": ["symbol", "value_usd"], "rows": [["ETH", 3000.0]]})
    );
}

#[tokio::test]
async fn query_without_wallet_is_empty() {
    let upstream = MockServer::start().await;
    let server = start(settings(ApiGeneration::Sim, &upstream)).await;

    let body: Value = reqwest::Client::new()
        .post(server.url("/v1/query"))
        .json(&json!({"table": "collectibles"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["rows"], json!([]));
    assert_eq!(body["columns"].as_array().unwrap().len(), 7);
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn query_error_statuses() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dex/pairs"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream broke"))
        .mount(&upstream)
        .await;

    let server = start(settings(ApiGeneration::Dune, &upstream)).await;
    let client = reqwest::Client::new();
    let cases = [
        (json!({"table": "nope"}), StatusCode::NOT_FOUND),
        (
            json!({"table": "dex", "columns": ["not_a_column"]}),
            StatusCode::BAD_REQUEST,
        ),
        (json!({"table": "dex"}), StatusCode::BAD_GATEWAY),
    ];

    for (query, expected) in cases {
        let response = client
            .post(server.url("/v1/query"))
            .json(&query)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), expected, "{query}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["status"], json!(expected.as_u16()));
    }
}

#[tokio::test]
async fn malformed_query_body() {
    let upstream = MockServer::start().await;
    let server = start(settings(ApiGeneration::Sim, &upstream)).await;

    let response = reqwest::Client::new()
        .post(server.url("/v1/query"))
        .header("content-type", "application/json")
        .body(r#"{"table": "balances",, }"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("invalid JSON syntax"));
}
