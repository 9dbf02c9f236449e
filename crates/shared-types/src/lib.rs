// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared types for the Dune table adapters
//!
//! Query predicates, parsed queries and tabular results are used by the API
//! client layer, the table adapters and the HTTP service alike, so they live
//! here to avoid circular dependencies.

pub mod predicate;
pub mod query;
pub mod table;

pub use predicate::{Operator, Predicate, PredicatesExt};
pub use query::ParsedQuery;
pub use table::{Row, TableError, TableResult};
