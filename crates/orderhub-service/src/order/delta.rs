//! Ledger contribution of a status change.

use orderhub_entity::order::status::classify;
use orderhub_entity::order::{OrderStatus, StatusClass};

/// Units to add to (positive) or remove from (negative) the target
/// volunteer's ledger when an order moves from `previous` to `next`.
///
/// Only a change of class moves units; an order with no status yet counts
/// as inactive.
pub fn ledger_delta(previous: Option<OrderStatus>, next: OrderStatus, quantity: i32) -> i32 {
    match (classify(previous), next.classify()) {
        (StatusClass::Inactive, StatusClass::Active) => quantity,
        (StatusClass::Active, StatusClass::Inactive) => -quantity,
        _ => 0,
    }
}
