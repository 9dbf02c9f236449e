// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Flat tabular results handed back to the host engine

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One result row, positionally aligned to the table's column list
pub type Row = Vec<Value>;

/// Errors raised while shaping a tabular result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A projection referenced a column the table does not declare
    #[error("unknown column '{column}'")]
    UnknownColumn {
        /// Requested column name
        column: String,
    },
}

/// A complete result set with a fixed column schema
///
/// The column list is always present, including when no rows were produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableResult {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TableResult {
    /// An empty result carrying the given schema
    pub fn empty(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a result from fixed-width rows
    ///
    /// The row width is checked at compile time against the column list.
    pub fn from_fixed<const N: usize>(
        columns: &[&str; N],
        rows: impl IntoIterator<Item = [Value; N]>,
    ) -> Self {
        Self {
            columns: columns.iter().map(ToString::to_string).collect(),
            rows: rows.into_iter().map(Vec::from).collect(),
        }
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value at `row` for the named column
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    /// Position of a column in the schema
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Keep only the requested columns, in the requested order
    pub fn project(self, columns: &[String]) -> Result<Self, TableError> {
        let indices = columns
            .iter()
            .map(|column| {
                self.column_index(column)
                    .ok_or_else(|| TableError::UnknownColumn {
                        column: column.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Ok(Self {
            columns: columns.to_vec(),
            rows,
        })
    }

    /// Keep at most `limit` rows
    #[must_use]
    pub fn truncate(mut self, limit: usize) -> Self {
        self.rows.truncate(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_result_keeps_schema() {
        let result = TableResult::empty(&["a", "b"]);
        assert!(result.is_empty());
        assert_eq!(result.columns(), ["a", "b"]);
    }

    #[test]
    fn projection_reorders_and_validates() {
        let result = TableResult::from_fixed(
            &["a", "b", "c"],
            [[json!(1), json!(2), json!(3)], [json!(4), json!(5), json!(6)]],
        );

        let projected = result
            .clone()
            .project(&["c".to_string(), "a".to_string()])
            .unwrap();
        assert_eq!(projected.columns(), ["c", "a"]);
        assert_eq!(projected.rows(), [vec![json!(3), json!(1)], vec![json!(6), json!(4)]]);

        assert_eq!(
            result.project(&["missing".to_string()]),
            Err(TableError::UnknownColumn {
                column: "missing".to_string()
            })
        );
    }

    #[test]
    fn value_lookup_by_name() {
        let result = TableResult::from_fixed(&["a", "b"], [[json!("x"), Value::Null]]);
        assert_eq!(result.value(0, "a"), Some(&json!("x")));
        assert_eq!(result.value(0, "b"), Some(&Value::Null));
        assert_eq!(result.value(1, "a"), None);
        assert_eq!(result.value(0, "z"), None);
    }

    #[test]
    fn truncate_limits_rows() {
        let result = TableResult::from_fixed(&["a"], [[json!(1)], [json!(2)], [json!(3)]]);
        assert_eq!(result.truncate(2).len(), 2);
    }

    #[test]
    fn serializes_columns_and_rows() {
        let result = TableResult::from_fixed(&["a"], [[json!(1)]]);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"columns": ["a"], "rows": [[1]]})
        );
    }
}
