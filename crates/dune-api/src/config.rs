// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Connection settings for the Dune client

use std::{collections::HashMap, fmt, str::FromStr, time::Duration};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{client::DuneError, non_empty_string::NonEmptyString};

const DEFAULT_PROBE_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_EXECUTION_TIMEOUT_SECONDS: u64 = 120;

/// Connection argument carrying the API key
pub const ARG_API_KEY: &str = "api_key";
/// Connection argument overriding the API root
pub const ARG_BASE_URL: &str = "base_url";
/// Connection argument selecting the API generation
pub const ARG_API_GENERATION: &str = "api_generation";
/// Connection argument for the probe timeout, in seconds
pub const ARG_PROBE_TIMEOUT_SECONDS: &str = "probe_timeout_seconds";
/// Connection argument for the execution poll interval, in milliseconds
pub const ARG_POLL_INTERVAL_MS: &str = "poll_interval_ms";
/// Connection argument for the execution deadline, in seconds
pub const ARG_EXECUTION_TIMEOUT_SECONDS: &str = "execution_timeout_seconds";

/// The remote API generation targeted by a deployment
///
/// The two generations use different endpoints, auth headers and payload
/// shapes, so exactly one is live at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiGeneration {
    /// Sim by Dune wallet analytics
    #[default]
    Sim,
    /// Dune Analytics query execution API
    Dune,
}

impl ApiGeneration {
    /// Default API root
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Sim => "https://api.sim.dune.com/v1",
            Self::Dune => "https://api.dune.com/api/v1",
        }
    }

    /// Name of the header carrying the API key
    pub fn auth_header(self) -> &'static str {
        match self {
            Self::Sim => "X-Sim-Api-Key",
            Self::Dune => "X-Dune-API-Key",
        }
    }

    /// Cheap endpoint used by the connectivity probe
    ///
    /// Both are lookups of a well-known zero key: any authenticated request
    /// answers 200 or 404.
    pub fn probe_endpoint(self) -> String {
        match self {
            Self::Sim => format!("/evm/balances/{}", Address::ZERO),
            Self::Dune => "/query/0".to_string(),
        }
    }

    /// Human readable service name
    pub fn service_name(self) -> &'static str {
        match self {
            Self::Sim => "Sim by Dune",
            Self::Dune => "Dune Analytics",
        }
    }

    /// Lowercase identifier used in configuration
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sim => "sim",
            Self::Dune => "dune",
        }
    }
}

impl FromStr for ApiGeneration {
    type Err = DuneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sim" => Ok(Self::Sim),
            "dune" => Ok(Self::Dune),
            other => Err(DuneError::Config(format!(
                "unknown API generation '{other}', expected 'sim' or 'dune'"
            ))),
        }
    }
}

impl fmt::Display for ApiGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the Dune API client
///
/// Immutable once the client is built. A missing API key is allowed so that
/// the probe can report it; data calls are sent unauthenticated in that case.
#[derive(Debug, Clone)]
pub struct DuneConfig {
    /// API key, `None` when not configured
    pub api_key: Option<NonEmptyString>,
    /// Validated API root without a trailing slash
    base_url: String,
    /// Targeted API generation
    pub generation: ApiGeneration,
    /// Upper bound for the connectivity probe
    pub probe_timeout: Duration,
    /// Delay between execution status polls
    pub poll_interval: Duration,
    /// Upper bound for waiting on a submitted execution
    pub execution_timeout: Duration,
}

impl Default for DuneConfig {
    fn default() -> Self {
        Self::new(ApiGeneration::default())
    }
}

impl DuneConfig {
    /// Configuration for `generation` with its default API root and no key
    pub fn new(generation: ApiGeneration) -> Self {
        Self {
            api_key: None,
            base_url: generation.default_base_url().to_string(),
            generation,
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECONDS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            execution_timeout: Duration::from_secs(DEFAULT_EXECUTION_TIMEOUT_SECONDS),
        }
    }

    /// Set the API key; blank input leaves the key unset
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = NonEmptyString::optional(api_key);
        self
    }

    /// Override the API root
    ///
    /// # Errors
    ///
    /// Returns [`DuneError::Config`] if `base_url` is not an absolute http(s) URL
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, DuneError> {
        let trimmed = base_url.trim();
        let parsed = Url::parse(trimmed)
            .map_err(|e| DuneError::Config(format!("invalid base_url '{trimmed}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DuneError::Config(format!(
                "invalid base_url '{trimmed}': scheme must be http or https"
            )));
        }
        self.base_url = trimmed.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Build a configuration from host connection arguments
    ///
    /// Recognized keys are `api_key`, `base_url`, `api_generation`,
    /// `probe_timeout_seconds`, `poll_interval_ms` and
    /// `execution_timeout_seconds`. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DuneError::Config`] for an unknown generation, an invalid URL
    /// or a non-numeric duration
    pub fn from_connection_args(args: &HashMap<String, String>) -> Result<Self, DuneError> {
        let generation = match non_blank(args, ARG_API_GENERATION) {
            Some(value) => value.parse()?,
            None => ApiGeneration::default(),
        };

        let mut config = Self::new(generation);
        if let Some(api_key) = args.get(ARG_API_KEY) {
            config = config.with_api_key(api_key.as_str());
        }
        if let Some(base_url) = non_blank(args, ARG_BASE_URL) {
            config = config.with_base_url(base_url)?;
        }
        if let Some(seconds) = parse_u64(args, ARG_PROBE_TIMEOUT_SECONDS)? {
            config.probe_timeout = Duration::from_secs(seconds);
        }
        if let Some(millis) = parse_u64(args, ARG_POLL_INTERVAL_MS)? {
            config.poll_interval = Duration::from_millis(millis);
        }
        if let Some(seconds) = parse_u64(args, ARG_EXECUTION_TIMEOUT_SECONDS)? {
            config.execution_timeout = Duration::from_secs(seconds);
        }
        Ok(config)
    }

    /// Validated API root without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of the endpoint made of `segments`, e.g. `["query", "1"]`
    ///
    /// Each segment is percent-encoded on its own: `/`, `?` and `#` inside a
    /// segment never reach another endpoint or the query string.
    ///
    /// # Errors
    ///
    /// Returns [`DuneError::Config`] if a segment is not a valid path segment
    pub fn endpoint_url<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url, DuneError> {
        if let Some(segment) = segments
            .iter()
            .map(AsRef::as_ref)
            .find(|segment: &&str| !is_path_segment(segment))
        {
            return Err(DuneError::Config(format!(
                "'{segment}' is not a valid path segment"
            )));
        }

        let mut url = Url::parse(&self.base_url).map_err(|e| {
            DuneError::Config(format!("invalid base_url '{}': {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| DuneError::Config(format!("base_url '{}' has no path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Whether `value` can be sent as one URL path segment
///
/// Empty values and the dot segments `.` and `..` cannot: URL normalization
/// would drop them or climb to the parent path.
pub fn is_path_segment(value: &str) -> bool {
    !matches!(value, "" | "." | "..")
}

/// Split an endpoint path such as `/query/1` into its segments
pub fn split_endpoint(endpoint: &str) -> Vec<&str> {
    endpoint.split('/').filter(|s| !s.is_empty()).collect()
}

fn non_blank<'a>(args: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    args.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_u64(args: &HashMap<String, String>, key: &str) -> Result<Option<u64>, DuneError> {
    non_blank(args, key)
        .map(|value| {
            value.parse::<u64>().map_err(|_| {
                DuneError::Config(format!("{key} must be a non-negative integer, got '{value}'"))
            })
        })
        .transpose()
}
