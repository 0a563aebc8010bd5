//! Order entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use orderhub_core::types::id::{OrderId, UserId};

use super::status::OrderStatus;

/// A customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// The customer who placed the order.
    pub customer_id: UserId,
    /// Volunteer credited with the referral, if any.
    pub referral_volunteer_id: Option<UserId>,
    /// Volunteer assigned to deliver, if any.
    pub delivery_volunteer_id: Option<UserId>,
    /// Current lifecycle status. `None` until the first transition.
    pub status: Option<OrderStatus>,
    /// Units eligible for commission. Fixed at checkout.
    pub quantity: i32,
    /// Free-form admin notes.
    pub notes: Option<String>,
    /// Delivery address as entered at checkout or corrected by an admin.
    pub delivery_address: Option<String>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build a new order as checkout would.
    pub fn new(customer_id: UserId, referral_volunteer_id: Option<UserId>, quantity: i32) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            customer_id,
            referral_volunteer_id,
            delivery_volunteer_id: None,
            status: None,
            quantity,
            notes: None,
            delivery_address: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the initial status.
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Field updates applied to an order in a single write.
///
/// `quantity` is deliberately absent: ledger contributions are computed
/// from the quantity fixed at checkout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderChanges {
    /// New lifecycle status.
    pub status: Option<OrderStatus>,
    /// Volunteer assigned to deliver.
    pub delivery_volunteer_id: Option<UserId>,
    /// Replacement admin notes.
    pub notes: Option<String>,
    /// Replacement delivery address.
    pub delivery_address: Option<String>,
}

impl OrderChanges {
    /// Check whether no field is being updated.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.delivery_volunteer_id.is_none()
            && self.notes.is_none()
            && self.delivery_address.is_none()
    }

    /// Apply the changes to an in-memory order.
    pub fn apply_to(&self, order: &mut Order, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            order.status = Some(status);
        }
        if let Some(volunteer) = self.delivery_volunteer_id {
            order.delivery_volunteer_id = Some(volunteer);
        }
        if let Some(notes) = &self.notes {
            order.notes = Some(notes.clone());
        }
        if let Some(address) = &self.delivery_address {
            order.delivery_address = Some(address.clone());
        }
        order.updated_at = now;
    }
}
