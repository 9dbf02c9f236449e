// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server configuration
//!
//! Sources are layered, later ones overriding earlier ones:
//! 1. built-in defaults
//! 2. `config.json`
//! 3. `config.{environment}.json`
//! 4. environment variables prefixed with `DUNE_TABLES_`, nested keys joined
//!    with `__` (`DUNE_TABLES_PORT`, `DUNE_TABLES_DUNE__API_KEY`)
//!
//! The environment itself always comes from `DUNE_TABLES_ENVIRONMENT`,
//! case-insensitively, defaulting to `development`.

use std::{
    collections::HashMap,
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::Path,
    time::Duration,
};

use anyhow::{Result, ensure};
use config::{Config, ConfigError, Environment as ConfigEnv, File};
use dune_api::{ApiGeneration, DuneConfig, DuneError};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::{ServerError, ServerResult};

/// Prefix of the environment variables read by [`ServerConfig::load`]
pub const ENV_PREFIX: &str = "DUNE_TABLES";
/// Variable selecting the environment-specific configuration file
pub const ENVIRONMENT_VAR: &str = "DUNE_TABLES_ENVIRONMENT";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production
    Production,
    /// Development
    Development,
    /// Tests; the only environment allowed to bind port 0
    Testing,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Production => "production",
            Self::Development => "development",
            Self::Testing => "testing",
        })
    }
}

/// Listening port
///
/// Port 0 (OS-assigned) is only accepted for [`Environment::Testing`], which
/// [`ServerConfig::validate`] enforces once the environment is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerPort(u16);

impl ServerPort {
    /// Validate a port for `environment`
    ///
    /// # Errors
    ///
    /// Returns an error for port 0 outside of testing
    pub fn new(port: u16, environment: Environment) -> Result<Self> {
        ensure!(
            port != 0 || environment == Environment::Testing,
            "port cannot be 0 in the {environment} environment"
        );
        Ok(Self(port))
    }

    /// Port number
    pub fn value(self) -> u16 {
        self.0
    }
}

/// Per-request timeout between 1 and 300 seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeoutSeconds(Duration);

impl TimeoutSeconds {
    /// Validate a timeout
    ///
    /// # Errors
    ///
    /// Returns an error if `seconds` is 0 or above 300
    pub fn new(seconds: u64) -> Result<Self> {
        ensure!(seconds != 0, "timeout must be greater than 0");
        ensure!(
            seconds <= MAX_TIMEOUT_SECONDS,
            "timeout cannot exceed {MAX_TIMEOUT_SECONDS} seconds"
        );
        Ok(Self(Duration::from_secs(seconds)))
    }

    /// Timeout duration
    pub fn value(self) -> Duration {
        self.0
    }
}

impl Default for TimeoutSeconds {
    fn default() -> Self {
        Self(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS))
    }
}

impl<'de> Deserialize<'de> for TimeoutSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Self::new(seconds).map_err(|e| de::Error::custom(e.to_string()))
    }
}

/// Connection settings for the Dune tables
///
/// Unset values fall back to the defaults of the selected API generation.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DuneSettings {
    /// API generation served by the live tables
    pub api_generation: ApiGeneration,
    /// API key; never serialized
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API root override
    pub base_url: Option<String>,
    /// Connectivity probe timeout, in seconds
    pub probe_timeout_seconds: Option<u64>,
    /// Delay between execution status polls, in milliseconds
    pub poll_interval_ms: Option<u64>,
    /// Deadline for a submitted execution, in seconds
    pub execution_timeout_seconds: Option<u64>,
}

impl fmt::Debug for DuneSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuneSettings")
            .field("api_generation", &self.api_generation)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("probe_timeout_seconds", &self.probe_timeout_seconds)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("execution_timeout_seconds", &self.execution_timeout_seconds)
            .finish()
    }
}

impl DuneSettings {
    /// Client configuration for these settings
    ///
    /// # Errors
    ///
    /// Returns [`DuneError::Config`] for an invalid base URL
    pub fn to_dune_config(&self) -> Result<DuneConfig, DuneError> {
        let mut config = DuneConfig::new(self.api_generation);
        if let Some(api_key) = &self.api_key {
            config = config.with_api_key(api_key.as_str());
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url)?;
        }
        if let Some(seconds) = self.probe_timeout_seconds {
            config.probe_timeout = Duration::from_secs(seconds);
        }
        if let Some(millis) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(millis);
        }
        if let Some(seconds) = self.execution_timeout_seconds {
            config.execution_timeout = Duration::from_secs(seconds);
        }
        Ok(config)
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: IpAddr,
    /// Bind port
    pub port: ServerPort,
    /// Per-request timeout
    pub timeout_seconds: TimeoutSeconds,
    /// Deployment environment
    pub environment: Environment,
    /// Remote API settings
    #[serde(default)]
    pub dune: DuneSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort(DEFAULT_PORT),
            timeout_seconds: TimeoutSeconds::default(),
            environment: Environment::Development,
            dune: DuneSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Load the configuration from the working directory and the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if a source is malformed or a value is invalid
    pub fn from_env() -> ServerResult<Self> {
        Self::load().map_err(|e| ServerError::Config {
            message: format!("failed to load configuration: {e}"),
        })
    }

    /// Load the configuration from the working directory and the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source is malformed or a value is invalid
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), None)
    }

    /// Load the configuration files found in `dir`
    ///
    /// `vars` replaces the process environment when given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source is malformed or a value is invalid
    pub fn load_from(
        dir: &Path,
        vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let environment = match &vars {
            Some(vars) => vars.get(ENVIRONMENT_VAR).cloned(),
            None => std::env::var(ENVIRONMENT_VAR).ok(),
        }
        .unwrap_or_else(|| Environment::Development.to_string())
        .to_lowercase();

        let config: Self = Config::builder()
            .set_default("host", Ipv4Addr::LOCALHOST.to_string())?
            .set_default("port", DEFAULT_PORT)?
            .set_default("timeout_seconds", DEFAULT_TIMEOUT_SECONDS)?
            .set_default("environment", environment.as_str())?
            .add_source(File::from(dir.join("config.json")).required(false))
            .add_source(File::from(dir.join(format!("config.{environment}.json"))).required(false))
            .add_source(
                ConfigEnv::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .set_override("environment", environment.as_str())?
            .build()?
            .try_deserialize()?;

        config
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(config)
    }

    /// Check constraints spanning several fields
    ///
    /// # Errors
    ///
    /// Returns an error for port 0 outside of testing or an invalid base URL
    pub fn validate(&self) -> Result<()> {
        ServerPort::new(self.port.value(), self.environment)?;
        self.dune.to_dune_config()?;
        Ok(())
    }

    /// Configuration for tests: OS-assigned port on localhost, short timeout
    pub fn for_testing() -> Self {
        Self {
            port: ServerPort(0),
            timeout_seconds: TimeoutSeconds(Duration::from_secs(5)),
            environment: Environment::Testing,
            ..Self::default()
        }
    }

    /// Socket address to bind
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port.value())
    }
}
