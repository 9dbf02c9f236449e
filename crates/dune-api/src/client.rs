// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Dune Analytics and Sim by Dune API client
//!
//! [`DuneClient`] is the only component that talks to the network. It is
//! cheap to clone and safe to share between concurrent queries; each call is
//! a single request with no retries and no pagination.

use api_client::{ApiClient, ApiError, ConnectionStatus, HttpMethod};
use reqwest::{Client, RequestBuilder, StatusCode, header::ACCEPT};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

use crate::{
    config::{DuneConfig, split_endpoint},
    models::{
        BalancesResponse, CollectiblesResponse, DexPair, ExecuteResponse, ExecutionResults,
        ExecutionStatus, Market, QueryMetadata, TransactionsResponse, TrendingContract,
        decode_list,
    },
};

const USER_AGENT: &str = concat!("dune-tables/", env!("CARGO_PKG_VERSION"));

/// Query-string parameters of a request
pub type QueryParams<'a> = [(&'a str, String)];

/// Errors specific to the Dune API client
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum DuneError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed with status {status}: {message}")]
    Unauthorized { status: u16, message: String },

    /// Response decoded but lacked a required field
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Execution reached a terminal state without results
    #[error("Execution {execution_id} ended in state {state}")]
    ExecutionFailed { execution_id: String, state: String },

    /// Execution did not finish before the deadline
    #[error("Execution {execution_id} did not finish within {seconds} seconds")]
    ExecutionTimeout { execution_id: String, seconds: u64 },
}

impl From<DuneError> for ApiError {
    fn from(value: DuneError) -> Self {
        match value {
            DuneError::Http(error) => ApiError::Http {
                message: error.to_string(),
            },
            DuneError::Json(error) => ApiError::InvalidResponse {
                message: error.to_string(),
            },
            DuneError::InvalidResponse(message) => ApiError::InvalidResponse { message },
            DuneError::ApiError { status, message } => ApiError::Remote {
                status,
                body: message,
            },
            DuneError::Unauthorized { .. } => ApiError::Authentication {
                message: value.to_string(),
            },
            DuneError::Config(message) => ApiError::Configuration { message },
            DuneError::ExecutionTimeout { seconds, .. } => {
                ApiError::Timeout {
                    timeout_seconds: seconds,
                }
            }
            DuneError::ExecutionFailed {
                execution_id,
                state,
            } => ApiError::Execution {
                execution_id,
                state,
            },
        }
    }
}

/// Dune API client implementation
#[derive(Debug, Clone)]
pub struct DuneClient {
    client: Client,
    config: DuneConfig,
}

impl DuneClient {
    /// Create a new client
    ///
    /// No global request timeout is installed: only the connectivity probe is
    /// bounded, and execution waits are bounded by the polling deadline.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: DuneConfig) -> Result<Self, DuneError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(DuneError::Http)?;

        Ok(Self { client, config })
    }

    /// Connection settings in use
    pub fn config(&self) -> &DuneConfig {
        &self.config
    }

    /// Whether an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn request<S: AsRef<str>>(
        &self,
        method: HttpMethod,
        path: &[S],
    ) -> Result<RequestBuilder, DuneError> {
        let url = self.config.endpoint_url(path)?;
        debug!(%method, %url, "calling Dune API");
        let request = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        }
        .header(ACCEPT, "application/json");

        Ok(match &self.config.api_key {
            Some(api_key) => request.header(self.config.generation.auth_header(), api_key.as_str()),
            None => request,
        })
    }

    /// Call an endpoint such as `/query/1` with a textual HTTP method
    ///
    /// Only `GET` and `POST` are supported; any other method, or a `.` or
    /// `..` path segment, fails with [`DuneError::Config`] before a request
    /// is made.
    ///
    /// # Errors
    ///
    /// Returns an error on unsupported methods, transport failures, non-2xx
    /// statuses (carrying status and body) and non-JSON bodies
    pub async fn call(
        &self,
        method: &str,
        endpoint: &str,
        params: &QueryParams<'_>,
        body: Option<&Value>,
    ) -> Result<Value, DuneError> {
        let method: HttpMethod = method.parse().map_err(|e: ApiError| match e {
            ApiError::Configuration { message } => DuneError::Config(message),
            other => DuneError::Config(other.to_string()),
        })?;
        self.send(method, &split_endpoint(endpoint), params, body)
            .await
    }

    /// Send one request to the endpoint made of `path` segments and return
    /// the parsed JSON body
    ///
    /// Every segment is encoded on its own, so caller-supplied values cannot
    /// change the endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid segments, transport failures, non-2xx
    /// statuses and non-JSON bodies
    pub async fn send<S: AsRef<str>>(
        &self,
        method: HttpMethod,
        path: &[S],
        params: &QueryParams<'_>,
        body: Option<&Value>,
    ) -> Result<Value, DuneError> {
        let mut request = self.request(method, path)?;
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(DuneError::Http)?;
        let url = response.url().clone();

        match response.status() {
            status if status.is_success() => {
                let bytes = response.bytes().await.map_err(DuneError::Http)?;
                Ok(serde_json::from_slice(&bytes)?)
            }
            status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                let message = response.text().await.unwrap_or_default();
                warn!(%url, status = status.as_u16(), "Dune API rejected the API key");
                Err(DuneError::Unauthorized {
                    status: status.as_u16(),
                    message,
                })
            }
            status => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                warn!(%url, "Dune API error: {} - {}", status.as_u16(), message);
                Err(DuneError::ApiError {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    /// `GET` an endpoint and decode it into a typed record
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not match `T`
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &[&str],
        params: &QueryParams<'_>,
    ) -> Result<T, DuneError> {
        let value = self.send(HttpMethod::Get, path, params, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `GET` an endpoint returning a JSON array of records
    ///
    /// Any other response shape yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or an element is not a record
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &[&str],
        params: &QueryParams<'_>,
    ) -> Result<Vec<T>, DuneError> {
        let value = self.send(HttpMethod::Get, path, params, None).await?;
        if !value.is_array() {
            debug!(?path, "expected a JSON array, treating response as empty");
        }
        Ok(decode_list(&value)?)
    }

    /// Token balances of a wallet
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails
    pub async fn balances(&self, wallet_address: &str) -> Result<BalancesResponse, DuneError> {
        self.get_json(&["evm", "balances", wallet_address], &[])
            .await
    }

    /// Transaction history of a wallet
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails
    pub async fn transactions(
        &self,
        wallet_address: &str,
    ) -> Result<TransactionsResponse, DuneError> {
        self.get_json(&["evm", "transactions", wallet_address], &[])
            .await
    }

    /// NFTs held by a wallet
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails
    pub async fn collectibles(
        &self,
        wallet_address: &str,
    ) -> Result<CollectiblesResponse, DuneError> {
        self.get_json(&["evm", "collectibles", wallet_address], &[])
            .await
    }

    /// Saved query metadata
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, including when the query does not exist
    pub async fn get_query(&self, query_id: u64) -> Result<QueryMetadata, DuneError> {
        let query_id = query_id.to_string();
        self.get_json(&["query", query_id.as_str()], &[]).await
    }

    /// Start an execution of a saved query and return its execution id
    ///
    /// Parameters are sent as `{"query_parameters": {...}}`; without
    /// parameters the body is an empty object.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no execution id is returned
    pub async fn submit_query(
        &self,
        query_id: u64,
        parameters: Option<&Map<String, Value>>,
    ) -> Result<String, DuneError> {
        let body = match parameters {
            Some(parameters) if !parameters.is_empty() => {
                json!({ "query_parameters": parameters })
            }
            _ => json!({}),
        };

        let value = self
            .send(
                HttpMethod::Post,
                &["query", query_id.to_string().as_str(), "execute"],
                &[],
                Some(&body),
            )
            .await?;
        let response: ExecuteResponse = serde_json::from_value(value)?;

        let execution_id = response.execution_id.ok_or_else(|| {
            DuneError::InvalidResponse(format!(
                "execute response for query {query_id} has no execution_id"
            ))
        })?;
        info!(query_id, %execution_id, "submitted query execution");
        Ok(execution_id)
    }

    /// Current status of an execution
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails
    pub async fn get_execution_status(
        &self,
        execution_id: &str,
    ) -> Result<ExecutionStatus, DuneError> {
        self.get_json(&["execution", execution_id, "status"], &[])
            .await
    }

    /// Columnar results of an execution
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails
    pub async fn get_execution_results(
        &self,
        execution_id: &str,
    ) -> Result<ExecutionResults, DuneError> {
        self.get_json(&["execution", execution_id, "results"], &[])
            .await
    }

    /// Poll an execution until it reaches a terminal state
    ///
    /// Polls every `poll_interval` until `execution_timeout` has elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`DuneError::ExecutionFailed`] for failed, cancelled or expired
    /// executions, [`DuneError::ExecutionTimeout`] when the deadline passes,
    /// and any error raised while fetching the status
    pub async fn wait_for_completion(
        &self,
        execution_id: &str,
    ) -> Result<ExecutionStatus, DuneError> {
        let deadline = Instant::now() + self.config.execution_timeout;

        loop {
            let status = self.get_execution_status(execution_id).await?;
            if status.is_finished()
                && let Some(state) = &status.state
            {
                if state.is_success() {
                    debug!(execution_id, %state, "execution completed");
                    return Ok(status);
                }
                warn!(execution_id, %state, "execution did not complete");
                return Err(DuneError::ExecutionFailed {
                    execution_id: execution_id.to_string(),
                    state: state.to_string(),
                });
            }

            if Instant::now() + self.config.poll_interval > deadline {
                warn!(execution_id, "gave up waiting for execution");
                return Err(DuneError::ExecutionTimeout {
                    execution_id: execution_id.to_string(),
                    seconds: self.config.execution_timeout.as_secs(),
                });
            }
            sleep(self.config.poll_interval).await;
        }
    }

    /// Trending contracts, optionally filtered
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails
    pub async fn trending_contracts(
        &self,
        params: &QueryParams<'_>,
    ) -> Result<Vec<TrendingContract>, DuneError> {
        self.get_list(&["contracts", "trending"], params).await
    }

    /// DEX pairs, optionally filtered
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails
    pub async fn dex_pairs(&self, params: &QueryParams<'_>) -> Result<Vec<DexPair>, DuneError> {
        self.get_list(&["dex", "pairs"], params).await
    }

    /// Market statistics of one market type, optionally filtered
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails
    pub async fn markets(
        &self,
        market_type: &str,
        params: &QueryParams<'_>,
    ) -> Result<Vec<Market>, DuneError> {
        self.get_list(&["markets", market_type], params)
            .await
    }
}

impl ApiClient for DuneClient {
    async fn probe(&self) -> ConnectionStatus {
        if !self.has_api_key() {
            warn!("no API key configured, skipping connectivity probe");
            return ConnectionStatus::credential_required();
        }

        let generation = self.config.generation;
        let endpoint = generation.probe_endpoint();
        debug!(endpoint, %generation, "probing Dune API connectivity");

        let request = match self.request(HttpMethod::Get, &split_endpoint(&endpoint)) {
            Ok(request) => request,
            Err(error) => return ConnectionStatus::failed(format!("Connection failed: {error}")),
        };
        let status = match timeout(self.config.probe_timeout, request.send()).await {
            Err(_) => ConnectionStatus::timed_out(),
            Ok(Err(error)) if error.is_timeout() => ConnectionStatus::timed_out(),
            Ok(Err(error)) if error.is_connect() => {
                ConnectionStatus::unreachable(generation.service_name())
            }
            Ok(Err(error)) => ConnectionStatus::failed(format!("Connection failed: {error}")),
            Ok(Ok(response)) => ConnectionStatus::from_probe_status(response.status().as_u16()),
        };

        if status.success {
            info!(%generation, "{}", status.message);
        } else {
            warn!(%generation, "{}", status.message);
        }
        status
    }

    fn name(&self) -> &'static str {
        self.config.generation.as_str()
    }
}
