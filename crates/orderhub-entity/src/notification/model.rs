//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use orderhub_core::types::id::{NotificationId, ScheduledNotificationId, UserId};

use crate::user::UserRole;

/// Delivery status written on every notification the core creates.
pub const DELIVERY_STATUS_SENT: &str = "sent";

/// A notification delivered to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient user.
    pub user_id: UserId,
    /// Role the recipient was addressed as.
    pub user_role: UserRole,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Link opened from the notification.
    pub action_url: Option<String>,
    /// Opaque priority label.
    pub priority: Option<String>,
    /// Whether the user has read this notification.
    pub is_read: bool,
    /// Delivery status label.
    pub delivery_status: String,
    /// The scheduled notification that produced this row, if any.
    pub scheduled_notification_id: Option<ScheduledNotificationId>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNotification {
    /// The recipient user.
    pub user_id: UserId,
    /// Role the recipient is addressed as.
    pub user_role: UserRole,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Link opened from the notification.
    pub action_url: Option<String>,
    /// Opaque priority label.
    pub priority: Option<String>,
    /// Always `false` on creation.
    pub is_read: bool,
    /// Always [`DELIVERY_STATUS_SENT`] on creation.
    pub delivery_status: String,
    /// Originating scheduled notification.
    pub scheduled_notification_id: Option<ScheduledNotificationId>,
}

impl CreateNotification {
    /// Build an unread, sent notification.
    pub fn new(
        user_id: UserId,
        user_role: UserRole,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            user_role,
            title: title.into(),
            message: message.into(),
            action_url: None,
            priority: None,
            is_read: false,
            delivery_status: DELIVERY_STATUS_SENT.to_string(),
            scheduled_notification_id: None,
        }
    }

    /// Materialize the row as the store would persist it.
    pub fn into_notification(self, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id: NotificationId::new(),
            user_id: self.user_id,
            user_role: self.user_role,
            title: self.title,
            message: self.message,
            action_url: self.action_url,
            priority: self.priority,
            is_read: self.is_read,
            delivery_status: self.delivery_status,
            scheduled_notification_id: self.scheduled_notification_id,
            created_at,
        }
    }
}
