//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use orderhub_core::types::id::{OrderId, UserId};
use orderhub_service::ReconcileRequest;

/// Body of `PATCH /api/orders/{id}/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateOrderStatusRequest {
    /// New status name. Unknown names are rejected by the reconciler.
    #[validate(length(min = 1, max = 32, message = "Status must not be empty"))]
    pub status: Option<String>,
    /// Volunteer to credit and assign for delivery.
    pub volunteer_id: Option<UserId>,
    /// Replacement admin notes.
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
    /// Replacement delivery address.
    #[validate(length(min = 1, max = 500, message = "Delivery address must be 1-500 characters"))]
    pub delivery_address: Option<String>,
}

impl UpdateOrderStatusRequest {
    /// Attach the order id from the path.
    pub fn into_reconcile(self, order_id: OrderId) -> ReconcileRequest {
        ReconcileRequest {
            order_id,
            status: self.status,
            volunteer_id: self.volunteer_id,
            notes: self.notes,
            delivery_address: self.delivery_address,
        }
    }
}
