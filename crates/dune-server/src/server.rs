// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server lifecycle
//!
//! The server owns a root [`CancellationToken`]. SIGINT, SIGTERM or
//! [`Server::shutdown`] cancel it; in-flight queries observe a child token
//! and the listener stops accepting connections. Connections still open after
//! [`ShutdownConfig::graceful_timeout`] are dropped.

use std::{net::SocketAddr, time::Duration};

use axum::{
    Router,
    http::{HeaderName, Request},
};
use dune_tables::DuneHandler;
use tokio::{net::TcpListener, time::sleep};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, warn};

use crate::{
    config::ServerConfig,
    error::{ServerError, ServerResult},
    routes::create_routes,
    state::ServerState,
};

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
const DEFAULT_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS: u64 = 30;

/// Shutdown behavior
#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// Time open connections get to finish once shutdown started
    pub graceful_timeout: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            graceful_timeout: Duration::from_secs(DEFAULT_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS),
        }
    }
}

/// HTTP front of the Dune table registry
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    router: Router,
    state: ServerState,
    cancellation_token: CancellationToken,
    shutdown_config: ShutdownConfig,
}

impl Server {
    /// Create a server, building the table registry from `config.dune`
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if the Dune settings are invalid
    pub fn new(config: ServerConfig, shutdown_config: ShutdownConfig) -> ServerResult<Self> {
        let handler = config
            .dune
            .to_dune_config()
            .and_then(DuneHandler::new)
            .map_err(|e| ServerError::Config {
                message: e.to_string(),
            })?;
        Ok(Self::with_handler(config, shutdown_config, handler))
    }

    /// Create a server around an existing table registry
    pub fn with_handler(
        config: ServerConfig,
        shutdown_config: ShutdownConfig,
        handler: DuneHandler,
    ) -> Self {
        let cancellation_token = CancellationToken::new();
        let state = ServerState::new(config.clone(), handler, cancellation_token.child_token());
        let router = Self::create_router(state.clone());

        Self {
            config,
            router,
            state,
            cancellation_token,
            shutdown_config,
        }
    }

    fn create_router(state: ServerState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
                    let request_id = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("unknown");
                    info_span!(
                        "http_request",
                        request_id,
                        method = %req.method(),
                        uri = %req.uri()
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
            .layer(CorsLayer::permissive())
            .layer(TimeoutLayer::new(state.config().timeout_seconds.value()));

        create_routes().layer(middleware).with_state(state)
    }

    async fn bind(&self) -> ServerResult<(TcpListener, SocketAddr)> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                address: addr,
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Startup { source })?;
        Ok((listener, local_addr))
    }

    /// Serve until a shutdown signal or [`Server::shutdown`]
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound and
    /// [`ServerError::Shutdown`] if serving fails
    pub async fn run(self) -> ServerResult<()> {
        let (listener, local_addr) = self.bind().await?;
        info!(
            address = %local_addr,
            environment = %self.config.environment,
            generation = %self.state.handler().generation(),
            "Dune tables server starting",
        );

        tokio::spawn(Self::shutdown_signal_handler(self.cancellation_token.clone()));

        let token = self.cancellation_token.clone();
        let mut serving = tokio::spawn(
            axum::serve(listener, self.router)
                .with_graceful_shutdown(token.clone().cancelled_owned())
                .into_future(),
        );

        let graceful_timeout = self.shutdown_config.graceful_timeout;
        tokio::select! {
            joined = &mut serving => match joined {
                Ok(Ok(())) => {
                    info!("Dune tables server shut down gracefully");
                    Ok(())
                }
                Ok(Err(source)) => {
                    error!(error = %source, "server error");
                    Err(ServerError::Shutdown { source })
                }
                Err(e) => Err(ServerError::Shutdown {
                    source: std::io::Error::other(e),
                }),
            },
            () = async {
                token.cancelled().await;
                sleep(graceful_timeout).await;
            } => {
                warn!(?graceful_timeout, "connections still open after the grace period, closing them");
                serving.abort();
                Ok(())
            }
        }
    }

    /// Cancel `cancellation_token` on SIGINT or SIGTERM
    async fn shutdown_signal_handler(cancellation_token: CancellationToken) {
        tokio::select! {
            signal = wait_for_signal() => {
                warn!(signal, "shutdown signal received, cancelling in-flight work");
                cancellation_token.cancel();
            },
            () = cancellation_token.cancelled() => {}
        }
    }

    /// Root cancellation token
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Start a graceful shutdown
    pub fn shutdown(&self) {
        info!("programmatic shutdown requested");
        self.cancellation_token.cancel();
    }

    /// Serve in a background task, returning the bound address and a token
    /// that stops the server when cancelled
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound
    pub async fn run_for_testing(self) -> ServerResult<(SocketAddr, CancellationToken)> {
        let (listener, local_addr) = self.bind().await?;
        let token = self.cancellation_token.clone();
        let stop = token.clone();
        tokio::spawn(async move {
            let _ = axum::serve(listener, self.router)
                .with_graceful_shutdown(stop.cancelled_owned())
                .await;
        });
        Ok((local_addr, token))
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Shared handler state
    pub fn state(&self) -> &ServerState {
        &self.state
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        },
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "failed to register signal handlers, only programmatic shutdown is available");
            std::future::pending().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to register CTRL+C handler, only programmatic shutdown is available");
        std::future::pending::<()>().await;
    }
    "CTRL+C"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[test]
    fn server_creation() {
        let server = Server::new(ServerConfig::for_testing(), ShutdownConfig::default()).unwrap();
        assert_eq!(server.config().environment, Environment::Testing);
        assert!(!server.cancellation_token().is_cancelled());
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let mut config = ServerConfig::for_testing();
        config.dune.base_url = Some("not a url".to_string());
        let error = Server::new(config, ShutdownConfig::default()).unwrap_err();
        assert!(matches!(error, ServerError::Config { .. }));
    }

    #[test]
    fn shutdown_cancels_handler_token() {
        let server = Server::new(ServerConfig::for_testing(), ShutdownConfig::default()).unwrap();
        let handler_token = server.state().cancellation_token.clone();

        server.shutdown();

        assert!(server.cancellation_token().is_cancelled());
        assert!(handler_token.is_cancelled());
    }

    #[tokio::test]
    async fn run_returns_after_shutdown() {
        let server = Server::new(ServerConfig::for_testing(), ShutdownConfig::default()).unwrap();
        let token = server.cancellation_token();
        let running = tokio::spawn(server.run());

        token.cancel();

        assert!(running.await.unwrap().is_ok());
    }
}
