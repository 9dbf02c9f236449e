// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Dune Analytics tables
//!
//! - `queries`: best-effort metadata lookup, failures read as "not found"
//! - `executions` and `results`: lookup by `execution_id`, or submit a saved
//!   query by `query_id`
//! - `contracts`, `dex` and `markets`: optional filters mapped to query-string
//!   parameters

use dune_api::is_path_segment;
use shared_types::{Predicate, PredicatesExt};

pub mod contracts;
pub mod dex;
pub mod executions;
pub mod markets;
pub mod queries;
pub mod results;

pub use contracts::ContractsTable;
pub use dex::DexTable;
pub use executions::ExecutionsTable;
pub use markets::MarketsTable;
pub use queries::QueriesTable;
pub use results::ResultsTable;

/// Column holding a saved query id
pub const QUERY_ID: &str = "query_id";
/// Column holding an execution id
pub const EXECUTION_ID: &str = "execution_id";

/// `column = value` usable as an endpoint path segment
///
/// `.` and `..` read as a malformed predicate: absent, not an error.
fn path_key(predicates: &[Predicate], column: &str) -> Option<String> {
    predicates
        .eq_string(column)
        .filter(|value| is_path_segment(value))
}

/// Collect optional `column = value` filters as `(parameter, value)` pairs
fn optional_params<'a>(
    predicates: &[Predicate],
    mapping: &[(&str, &'a str)],
) -> Vec<(&'a str, String)> {
    mapping
        .iter()
        .filter_map(|&(column, parameter)| {
            predicates
                .eq_string(column)
                .map(|value| (parameter, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_params_skip_absent_filters() {
        let predicates = vec![
            Predicate::equals("project_name", "uniswap"),
            Predicate::equals("blockchain", ""),
        ];
        let params = optional_params(
            &predicates,
            &[("blockchain", "blockchain"), ("project_name", "project")],
        );
        assert_eq!(params, vec![("project", "uniswap".to_string())]);
    }

    #[test]
    fn dot_segments_are_not_path_keys() {
        let predicates = vec![
            Predicate::equals(EXECUTION_ID, ".."),
            Predicate::equals("market_type", "nft"),
        ];
        assert_eq!(path_key(&predicates, EXECUTION_ID), None);
        assert_eq!(path_key(&predicates, "market_type").as_deref(), Some("nft"));
    }
}
