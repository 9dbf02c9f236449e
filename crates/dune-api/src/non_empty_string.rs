// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Non-empty string validation
//!
//! [`NonEmptyString`] makes blank credentials unrepresentable: once a value
//! exists it holds at least one non-whitespace character.
//!
//! ```rust
//! use dune_api::NonEmptyString;
//!
//! let api_key = NonEmptyString::new("sim_1234567890").expect("valid key");
//! assert_eq!(api_key.as_str(), "sim_1234567890");
//!
//! assert!(NonEmptyString::new("").is_err());
//! assert!(NonEmptyString::new("   \t\n  ").is_err());
//! ```

use core::fmt;
use std::str::FromStr;

/// A string guaranteed to contain a non-whitespace character
///
/// Surrounding whitespace is removed at construction, so a key pasted with a
/// trailing newline still authenticates.
#[derive(Clone, PartialEq, Eq)]
pub struct NonEmptyString(Box<str>);

impl NonEmptyString {
    /// Validate and wrap a string
    ///
    /// # Errors
    ///
    /// Returns a descriptive message if the input is empty or whitespace-only
    pub fn new(s: impl Into<String>) -> Result<Self, String> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Err("String cannot be empty or whitespace-only".to_string())
        } else {
            Ok(NonEmptyString(trimmed.into()))
        }
    }

    /// Wrap a string, mapping blank input to `None`
    pub fn optional(s: impl Into<String>) -> Option<Self> {
        Self::new(s).ok()
    }

    /// Get a string slice of the contained value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Credentials end up in these values; keep them out of logs.
impl fmt::Debug for NonEmptyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NonEmptyString(***)")
    }
}

impl fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NonEmptyString {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let value = NonEmptyString::new("  key\n").unwrap();
        assert_eq!(value.as_str(), "key");
        assert_eq!(value.to_string(), "key");
    }

    #[test]
    fn blank_input_is_rejected() {
        assert!(NonEmptyString::new("").is_err());
        assert!(NonEmptyString::optional(" ").is_none());
        assert!(NonEmptyString::optional("k").is_some());
    }

    #[test]
    fn debug_output_is_redacted() {
        let value = NonEmptyString::new("secret").unwrap();
        assert!(!format!("{value:?}").contains("secret"));
    }
}
