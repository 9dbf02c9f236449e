// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Connection status reported by the connectivity probe

use serde::{Deserialize, Serialize};

/// Failure message when no credential is configured
pub const MSG_CREDENTIAL_REQUIRED: &str = "Connection failed: API key is required";
/// Failure message when the remote rejects the credential
pub const MSG_INVALID_CREDENTIAL: &str = "Connection failed: Invalid API key";
/// Success message
pub const MSG_CONNECTED: &str = "Connection established successfully";
/// Failure message when the probe exceeds its timeout
pub const MSG_TIMEOUT: &str = "Connection failed: Request timeout";

/// Outcome of a connectivity probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Whether the remote API is reachable with the configured credential
    pub success: bool,
    /// Human readable description of the outcome
    pub message: String,
}

impl ConnectionStatus {
    /// A successful probe
    pub fn connected() -> Self {
        Self {
            success: true,
            message: MSG_CONNECTED.to_string(),
        }
    }

    /// A failed probe with the given message
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    /// No credential configured, the network was never touched
    pub fn credential_required() -> Self {
        Self::failed(MSG_CREDENTIAL_REQUIRED)
    }

    /// The probe did not complete in time
    pub fn timed_out() -> Self {
        Self::failed(MSG_TIMEOUT)
    }

    /// The remote host could not be reached
    pub fn unreachable(service: &str) -> Self {
        Self::failed(format!("Connection failed: Cannot connect to {service} API"))
    }

    /// Map the HTTP status of a probe response to a connection status
    ///
    /// 401 and 403 mean the credential was rejected. 200 and 404 both prove
    /// the request was authenticated. Anything else is reported verbatim.
    pub fn from_probe_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::failed(MSG_INVALID_CREDENTIAL),
            200 | 404 => Self::connected(),
            other => Self::failed(format!("Connection test returned status {other}")),
        }
    }
}
