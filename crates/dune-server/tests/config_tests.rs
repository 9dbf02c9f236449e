// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Layered configuration loading from files

use std::{collections::HashMap, fs, time::Duration};

use dune_api::ApiGeneration;
use dune_server::{Environment, ServerConfig, config::ENVIRONMENT_VAR};
use serde_json::json;

fn write_json(dir: &tempfile::TempDir, name: &str, value: &serde_json::Value) {
    fs::write(dir.path().join(name), value.to_string()).unwrap();
}

#[test]
fn defaults_without_sources() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::load_from(dir.path(), Some(HashMap::new())).unwrap();

    assert_eq!(config.port.value(), 3000);
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.timeout_seconds.value(), Duration::from_secs(30));
    assert_eq!(config.dune.api_generation, ApiGeneration::Sim);
    assert!(config.dune.api_key.is_none());
}

#[test]
fn environment_file_overrides_base_file() {
    let dir = tempfile::tempdir().unwrap();
    write_json(
        &dir,
        "config.json",
        &json!({
            "port": 8080,
            "dune": {"api_generation": "dune", "poll_interval_ms": 500}
        }),
    );
    write_json(
        &dir,
        "config.production.json",
        &json!({"port": 443, "timeout_seconds": 60}),
    );

    let vars = HashMap::from([(ENVIRONMENT_VAR.to_string(), "Production".to_string())]);
    let config = ServerConfig::load_from(dir.path(), Some(vars)).unwrap();

    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.port.value(), 443);
    assert_eq!(config.timeout_seconds.value(), Duration::from_secs(60));
    assert_eq!(config.dune.api_generation, ApiGeneration::Dune);

    let dune = config.dune.to_dune_config().unwrap();
    assert_eq!(dune.base_url(), "https://api.dune.com/api/v1");
    assert_eq!(dune.poll_interval, Duration::from_millis(500));
}

#[test]
fn environment_variables_override_files() {
    let dir = tempfile::tempdir().unwrap();
    write_json(&dir, "config.json", &json!({"dune": {"api_key": "from-file"}}));

    let vars = HashMap::from([("DUNE_TABLES_DUNE__API_KEY".to_string(), "from-env".to_string())]);
    let config = ServerConfig::load_from(dir.path(), Some(vars)).unwrap();

    assert_eq!(config.dune.api_key.as_deref(), Some("from-env"));
}

#[test]
fn invalid_values_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_json(&dir, "config.json", &json!({"timeout_seconds": 0}));
    assert!(ServerConfig::load_from(dir.path(), Some(HashMap::new())).is_err());

    write_json(&dir, "config.json", &json!({"port": 0}));
    assert!(ServerConfig::load_from(dir.path(), Some(HashMap::new())).is_err());

    let testing = HashMap::from([(ENVIRONMENT_VAR.to_string(), "testing".to_string())]);
    assert!(ServerConfig::load_from(dir.path(), Some(testing)).is_ok());

    write_json(&dir, "config.json", &json!({"dune": {"base_url": "ftp://example.com"}}));
    assert!(ServerConfig::load_from(dir.path(), Some(HashMap::new())).is_err());
}
