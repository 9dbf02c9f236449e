// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Structured queries received from the host engine

use serde::{Deserialize, Serialize};

use crate::predicate::Predicate;

/// A parsed SELECT against one virtual table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    /// Table identifier, possibly qualified (`dune.balances`)
    pub table: String,
    /// Conditions from the WHERE clause
    #[serde(default)]
    pub predicates: Vec<Predicate>,
    /// Projected columns, all columns when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    /// Maximum number of rows to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ParsedQuery {
    /// Query every column of `table` with no conditions
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            predicates: Vec::new(),
            columns: None,
            limit: None,
        }
    }

    /// Add a condition
    #[must_use]
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Restrict the projected columns
    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Cap the number of returned rows
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Unqualified, lowercased table name
    ///
    /// Only the last dot-separated segment is significant, so `dune.Balances`
    /// and `balances` name the same table.
    pub fn table_name(&self) -> String {
        self.table
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches('"')
            .to_ascii_lowercase()
    }
}
