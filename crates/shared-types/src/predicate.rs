// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Filter predicates extracted from a query's WHERE clause
//!
//! The host engine hands over already-parsed comparison conditions. Table
//! adapters only ever act on equality against a handful of named columns;
//! everything else is carried along untouched and ignored.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator of a predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=` or `<>`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `like`
    Like,
    /// `in`
    In,
    /// Any operator text the adapters do not recognize
    Other(String),
}

impl Operator {
    /// Canonical textual form of the operator
    pub fn as_str(&self) -> &str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "like",
            Self::In => "in",
            Self::Other(op) => op,
        }
    }
}

impl From<&str> for Operator {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "=" | "==" => Self::Eq,
            "!=" | "<>" => Self::NotEq,
            "<" => Self::Lt,
            "<=" => Self::LtEq,
            ">" => Self::Gt,
            ">=" => Self::GtEq,
            "like" => Self::Like,
            "in" => Self::In,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl From<String> for Operator {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Operator> for String {
    fn from(value: Operator) -> Self {
        match value {
            Operator::Other(op) => op,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `(operator, column, value)` condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    /// Comparison operator
    pub op: Operator,
    /// Left operand, the referenced column name
    pub column: String,
    /// Right operand, a literal value
    pub value: Value,
}

impl Predicate {
    /// Create a new predicate
    pub fn new(op: impl Into<Operator>, column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            op: op.into(),
            column: column.into(),
            value: value.into(),
        }
    }

    /// Shorthand for an equality predicate
    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(Operator::Eq, column, value)
    }

    fn is_eq_on(&self, column: &str) -> bool {
        self.op == Operator::Eq && self.column == column
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.op, self.value)
    }
}

/// Equality lookups over a predicate list
///
/// When the same column is constrained more than once the last condition
/// wins. Values that cannot serve as a lookup key (null, blank strings,
/// arrays, objects) count as absent.
pub trait PredicatesExt {
    /// Raw right operand of the last `column = value` predicate
    fn eq_value(&self, column: &str) -> Option<&Value>;

    /// Right operand of the last `column = value` predicate rendered as text
    fn eq_string(&self, column: &str) -> Option<String> {
        self.eq_value(column).and_then(scalar_to_string)
    }

    /// Right operand of the last `column = value` predicate as an unsigned id
    fn eq_u64(&self, column: &str) -> Option<u64> {
        match self.eq_value(column)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl PredicatesExt for [Predicate] {
    fn eq_value(&self, column: &str) -> Option<&Value> {
        self.iter()
            .rev()
            .find(|predicate| predicate.is_eq_on(column))
            .map(|predicate| &predicate.value)
    }
}

impl PredicatesExt for Vec<Predicate> {
    fn eq_value(&self, column: &str) -> Option<&Value> {
        self.as_slice().eq_value(column)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn operator_parsing() {
        assert_eq!(Operator::from("="), Operator::Eq);
        assert_eq!(Operator::from("<>"), Operator::NotEq);
        assert_eq!(Operator::from(" LIKE "), Operator::Like);
        assert_eq!(
            Operator::from("between"),
            Operator::Other("between".to_string())
        );
    }

    #[test]
    fn predicate_deserializes_from_host_json() {
        let predicate: Predicate =
            serde_json::from_value(json!({"op": "=", "column": "wallet_address", "value": "0xABC"}))
                .unwrap();
        assert_eq!(predicate, Predicate::equals("wallet_address", "0xABC"));

        let unknown: Predicate =
            serde_json::from_value(json!({"op": "between", "column": "x", "value": [1, 2]}))
                .unwrap();
        assert_eq!(unknown.op, Operator::Other("between".to_string()));
        assert_eq!(serde_json::to_value(&unknown).unwrap()["op"], "between");
    }

    #[test]
    fn eq_lookup_ignores_other_operators() {
        let predicates = vec![
            Predicate::new(Operator::Gt, "wallet_address", "0x1"),
            Predicate::equals("chain", "ethereum"),
        ];
        assert_eq!(predicates.eq_string("wallet_address"), None);
        assert_eq!(predicates.eq_string("chain").as_deref(), Some("ethereum"));
    }

    #[test]
    fn eq_lookup_last_match_wins() {
        let predicates = vec![
            Predicate::equals("wallet_address", "0x1"),
            Predicate::equals("wallet_address", "0x2"),
        ];
        assert_eq!(predicates.eq_string("wallet_address").as_deref(), Some("0x2"));
    }

    #[test]
    fn eq_lookup_treats_blank_and_null_as_absent() {
        let predicates = vec![
            Predicate::equals("a", ""),
            Predicate::equals("b", Value::Null),
            Predicate::equals("c", json!(["x"])),
        ];
        assert_eq!(predicates.eq_string("a"), None);
        assert_eq!(predicates.eq_string("b"), None);
        assert_eq!(predicates.eq_string("c"), None);
    }

    #[test]
    fn eq_u64_accepts_numbers_and_numeric_text() {
        let predicates = vec![
            Predicate::equals("query_id", 1234),
            Predicate::equals("other_id", "42"),
            Predicate::equals("bad_id", "abc"),
        ];
        assert_eq!(predicates.eq_u64("query_id"), Some(1234));
        assert_eq!(predicates.eq_u64("other_id"), Some(42));
        assert_eq!(predicates.eq_u64("bad_id"), None);
        assert_eq!(predicates.eq_string("query_id").as_deref(), Some("1234"));
    }
}
