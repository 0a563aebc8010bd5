//! Order lifecycle status and its ledger classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of an order.
///
/// Delivery-tracking micro-events (picked up, on the way, ...) are kept on a
/// separate timeline and are not statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting confirmation.
    Pending,
    /// Confirmed by an admin or volunteer.
    Confirmed,
    /// Handed to the customer.
    Delivered,
    /// The customer could not be reached.
    CantReach,
    /// Cancelled.
    Cancelled,
}

/// Whether a status counts toward a volunteer's ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusClass {
    /// Counts toward the ledger.
    Active,
    /// Does not count toward the ledger.
    Inactive,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Delivered,
        Self::CantReach,
        Self::Cancelled,
    ];

    /// Classify the status for ledger purposes.
    pub fn classify(&self) -> StatusClass {
        match self {
            Self::Pending | Self::Confirmed | Self::Delivered => StatusClass::Active,
            Self::CantReach | Self::Cancelled => StatusClass::Inactive,
        }
    }

    /// Check if the status counts toward the ledger.
    pub fn is_active(&self) -> bool {
        self.classify() == StatusClass::Active
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Delivered => "delivered",
            Self::CantReach => "cant_reach",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Classify an optional status; an order that has never had a status is
/// treated as inactive.
pub fn classify(status: Option<OrderStatus>) -> StatusClass {
    status.map_or(StatusClass::Inactive, |s| s.classify())
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = orderhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "delivered" => Ok(Self::Delivered),
            "cant_reach" => Ok(Self::CantReach),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(orderhub_core::AppError::validation(format!(
                "Invalid order status: '{s}'. Expected one of: pending, confirmed, delivered, cant_reach, cancelled"
            ))),
        }
    }
}
