// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! JSON body extractor with descriptive rejections
//!
//! Unlike `axum::Json`, every failure is reported as a 400 with a hint on
//! what is wrong with the payload.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

use crate::error::ServerError;

const MAX_JSON_PAYLOAD_SIZE: usize = 1024 * 1024;

mod hints {
    pub const MISSING_COMMA: &str = "check for missing or extra commas between elements";
    pub const MISSING_BRACE: &str = "check for a missing closing brace '}'";
    pub const MISSING_BRACKET: &str = "check for a missing closing bracket ']'";
    pub const MISSING_QUOTES: &str = "check for missing or unescaped quotes around strings";
    pub const EXPECTED_VALUE: &str = "expected a JSON value";
    pub const DEFAULT_SYNTAX: &str = "check JSON formatting";
    pub const EMPTY_BODY: &str = "request body is empty, expected a JSON object";
    pub const TRUNCATED: &str = "unexpected end of JSON input, the body appears truncated";
}

/// `application/json` body deserialized into `T`
#[derive(Debug)]
pub struct JsonExtractor<T>(pub T);

impl<T, S> FromRequest<S> for JsonExtractor<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(content_type) = req.headers().get(CONTENT_TYPE)
            && let Ok(content_type) = content_type.to_str()
            && !content_type.starts_with("application/json")
        {
            return Err(json_error(format!(
                "invalid content-type: expected 'application/json', got '{content_type}'"
            )));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| json_error(format!("failed to read request body: {rejection}")))?;

        if bytes.len() > MAX_JSON_PAYLOAD_SIZE {
            return Err(json_error(format!(
                "request body too large: {} bytes (max: {MAX_JSON_PAYLOAD_SIZE} bytes)",
                bytes.len()
            )));
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(json_error(hints::EMPTY_BODY.to_string()));
        }

        serde_json::from_slice(&bytes)
            .map(JsonExtractor)
            .map_err(|err| json_error(describe(&err)))
    }
}

fn json_error(message: String) -> ServerError {
    ServerError::JsonError { message }
}

fn describe(err: &serde_json::Error) -> String {
    if err.is_eof() {
        hints::TRUNCATED.to_string()
    } else if err.is_syntax() {
        format!(
            "invalid JSON syntax at line {}, column {}: {}",
            err.line(),
            err.column(),
            syntax_hint(err)
        )
    } else if err.is_data() {
        format!("JSON data validation failed: {err}")
    } else {
        format!("JSON parsing error: {err}")
    }
}

fn syntax_hint(err: &serde_json::Error) -> &'static str {
    let message = err.to_string();
    if message.contains("expected ','") || message.contains("trailing comma") {
        hints::MISSING_COMMA
    } else if message.contains("expected '}'") {
        hints::MISSING_BRACE
    } else if message.contains("expected ']'") {
        hints::MISSING_BRACKET
    } else if message.contains("expected '\"'") {
        hints::MISSING_QUOTES
    } else if message.contains("expected value") {
        hints::EXPECTED_VALUE
    } else {
        hints::DEFAULT_SYNTAX
    }
}
