//! Order domain events handed to the notification dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderhub_core::types::id::{OrderId, UserId};

use super::status::OrderStatus;

/// Emitted after an order's status actually changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    /// The order.
    pub order_id: OrderId,
    /// Status before the change (`None` for the first transition).
    pub previous_status: Option<OrderStatus>,
    /// Status after the change.
    pub new_status: OrderStatus,
    /// The ordering customer.
    pub customer_id: UserId,
    /// The volunteer the ledger logic targeted, if any.
    pub volunteer_id: Option<UserId>,
    /// When the change was committed.
    pub occurred_at: DateTime<Utc>,
}
