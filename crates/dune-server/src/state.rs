// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared application state

use std::sync::Arc;

use dune_api::ApiGeneration;
use dune_tables::DuneHandler;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::config::{Environment, ServerConfig};

/// State shared by all request handlers
#[derive(Debug, Clone)]
pub struct ServerState {
    config: Arc<ServerConfig>,
    handler: Arc<DuneHandler>,
    /// Cancelled when the server starts shutting down
    pub cancellation_token: CancellationToken,
}

impl ServerState {
    /// Create the state from a configuration and a table registry
    pub fn new(
        config: ServerConfig,
        handler: DuneHandler,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            config: Arc::new(config),
            handler: Arc::new(handler),
            cancellation_token,
        }
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Table registry
    pub fn handler(&self) -> &DuneHandler {
        &self.handler
    }

    /// Probe the remote API and describe the service
    pub async fn health_check(&self) -> HealthCheck {
        let status = self.handler.check_connection().await;
        HealthCheck {
            success: status.success,
            message: status.message,
            generation: self.handler.generation(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: self.config.environment,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Whether the remote API accepted the configured credential
    pub success: bool,
    /// Probe outcome
    pub message: String,
    /// API generation served by the live tables
    pub generation: ApiGeneration,
    /// Service version
    pub version: String,
    /// Deployment environment
    pub environment: Environment,
    /// Time of the check, RFC 3339
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use api_client::health;
    use dune_api::DuneConfig;

    use super::*;

    fn state(token: CancellationToken) -> ServerState {
        let handler = DuneHandler::new(DuneConfig::default()).unwrap();
        ServerState::new(ServerConfig::for_testing(), handler, token)
    }

    #[tokio::test]
    async fn health_without_key_reports_missing_credential() {
        let check = state(CancellationToken::new()).health_check().await;
        assert!(!check.success);
        assert_eq!(check.message, health::MSG_CREDENTIAL_REQUIRED);
        assert_eq!(check.generation, ApiGeneration::Sim);
        assert_eq!(check.environment, Environment::Testing);
    }

    #[test]
    fn cancellation_is_shared() {
        let token = CancellationToken::new();
        let state = state(token.clone());
        assert!(!state.cancellation_token.is_cancelled());
        token.cancel();
        assert!(state.cancellation_token.is_cancelled());
    }
}
