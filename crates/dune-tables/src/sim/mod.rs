// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Sim by Dune wallet tables
//!
//! Every table here requires an equality predicate on `wallet_address`.
//! Without one, or when the value is `.` or `..`, the table answers with an
//! empty result and makes no request.
//! Request failures propagate to the caller.

use dune_api::is_path_segment;
use shared_types::{Predicate, PredicatesExt};
use tracing::debug;

pub mod balances;
pub mod collectibles;
pub mod transactions;

pub use balances::BalancesTable;
pub use collectibles::CollectiblesTable;
pub use transactions::TransactionsTable;

/// Column every Sim table is keyed by
pub const WALLET_ADDRESS: &str = "wallet_address";

fn required_wallet_address(table: &str, predicates: &[Predicate]) -> Option<String> {
    let wallet_address = predicates
        .eq_string(WALLET_ADDRESS)
        .filter(|address| is_path_segment(address));
    if wallet_address.is_none() {
        debug!(table, "no usable wallet_address = predicate, skipping remote call");
    }
    wallet_address
}
