// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs, dead_code)]

//! Mock Dune and Sim backends for table tests

use std::{sync::Arc, time::Duration};

use dune_api::{ApiGeneration, DuneClient, DuneConfig};
use dune_tables::DuneHandler;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

pub const TEST_API_KEY: &str = "test-api-key";
pub const WALLET: &str = "0xABC";
pub const EXECUTION_ID: &str = "01HKZJ2683PHF9Q9PHHQ8FW4Q1";
pub const QUERY_ID: u64 = 1234;

pub fn config(generation: ApiGeneration, base_url: &str) -> DuneConfig {
    let mut config = DuneConfig::new(generation)
        .with_api_key(TEST_API_KEY)
        .with_base_url(base_url)
        .unwrap();
    config.poll_interval = Duration::from_millis(10);
    config.execution_timeout = Duration::from_secs(2);
    config
}

pub fn client(generation: ApiGeneration, server: &MockServer) -> Arc<DuneClient> {
    Arc::new(DuneClient::new(config(generation, &server.uri())).unwrap())
}

pub fn handler(generation: ApiGeneration, server: &MockServer) -> DuneHandler {
    DuneHandler::new(config(generation, &server.uri())).unwrap()
}

/// Mount a `GET` responder for `endpoint` with the Sim auth header
pub async fn mount_sim(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(header("X-Sim-Api-Key", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a `GET` responder for `endpoint` with the Dune auth header
pub async fn mount_dune(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(header("X-Dune-API-Key", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount the execute endpoint of `QUERY_ID`
pub async fn mount_execute(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/query/{QUERY_ID}/execute")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "execution_id": EXECUTION_ID,
            "state": "QUERY_STATE_PENDING"
        })))
        .expect(1)
        .mount(server)
        .await;
}

pub fn balances_response() -> Value {
    json!({
        "balances": [{
            "address": "0xT1",
            "amount": "100",
            "chain": "ethereum",
            "decimals": 18,
            "price_usd": 1.0,
            "symbol": "T1",
            "value_usd": 100.0
        }],
        "wallet_address": "0xABC"
    })
}

pub fn transactions_response() -> Value {
    json!({
        "wallet_address": WALLET,
        "transactions": [
            {
                "block_number": 19_000_000,
                "hash": "0xh1",
                "from": "0xABC",
                "to": "0xdef",
                "value": "1000000000000000000",
                "gas_used": 21000,
                "block_time": "2024-01-01T00:00:00Z",
                "chain": "ethereum"
            },
            {
                "block_number": "19000001",
                "hash": "0xh2",
                "from_address": "0xdef",
                "to_address": "0xABC",
                "timestamp": "2024-01-02T00:00:00Z"
            }
        ]
    })
}

pub fn collectibles_response() -> Value {
    json!({
        "wallet_address": WALLET,
        "entries": [{
            "contract_address": "0xc0",
            "token_id": 42,
            "name": "Punk #42",
            "image_url": "https://img.example/42.png",
            "chain": "ethereum",
            "collection_name": "Punks"
        }]
    })
}

pub fn status_response(state: &str) -> Value {
    json!({
        "execution_id": EXECUTION_ID,
        "query_id": QUERY_ID,
        "state": state,
        "submitted_at": "2024-01-01T00:00:00Z",
        "execution_started_at": "2024-01-01T00:00:01Z",
        "expires_at": "2024-04-01T00:00:00Z",
        "is_execution_finished": state == "QUERY_STATE_COMPLETED"
    })
}

pub fn results_response() -> Value {
    json!({
        "execution_id": EXECUTION_ID,
        "query_id": QUERY_ID,
        "state": "QUERY_STATE_COMPLETED",
        "result": {
            "rows": [["v1", 2], ["v3", 4]],
            "metadata": {"column_names": ["c1", "c2"]}
        }
    })
}
