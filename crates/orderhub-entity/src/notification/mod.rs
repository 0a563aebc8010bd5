//! Notification domain entities.

pub mod model;

pub use model::{CreateNotification, DELIVERY_STATUS_SENT, Notification};
