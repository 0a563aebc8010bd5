//! Scheduled notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use orderhub_core::result::AppResult;
use orderhub_core::types::id::ScheduledNotificationId;

use super::status::{Recurrence, ScheduleStatus};
use super::target::TargetFilter;

/// A bulk notification template with a due time and optional recurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ScheduledNotification {
    /// Unique identifier.
    pub id: ScheduledNotificationId,
    /// Notification title, forwarded verbatim.
    pub title: String,
    /// Notification body, forwarded verbatim.
    pub message: String,
    /// Link opened from the notification, forwarded verbatim.
    pub action_url: Option<String>,
    /// Opaque priority label, forwarded verbatim.
    pub priority: Option<String>,
    /// Audience selection rule as stored; see [`Self::target`].
    pub target_filters: Json<serde_json::Value>,
    /// Cadence.
    pub recurrence: Recurrence,
    /// Next due time.
    pub scheduled_for: DateTime<Utc>,
    /// Processing state.
    pub status: ScheduleStatus,
    /// Last successful dispatch.
    pub last_sent_at: Option<DateTime<Utc>>,
    /// Failure reason when `status` is `failed`.
    pub error_message: Option<String>,
    /// When the schedule was created.
    pub created_at: DateTime<Utc>,
    /// When the schedule was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ScheduledNotification {
    /// Build a pending schedule.
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        target: TargetFilter,
        recurrence: Recurrence,
        scheduled_for: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ScheduledNotificationId::new(),
            title: title.into(),
            message: message.into(),
            action_url: None,
            priority: None,
            target_filters: Json(serde_json::to_value(target).unwrap_or_default()),
            recurrence,
            scheduled_for,
            status: ScheduleStatus::Pending,
            last_sent_at: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Parse the audience rule.
    pub fn target(&self) -> AppResult<TargetFilter> {
        Ok(serde_json::from_value(self.target_filters.0.clone())?)
    }

    /// Check if the schedule is waiting and its time has come.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == ScheduleStatus::Pending && self.scheduled_for <= now
    }

    /// Whether a `processing` claim was taken before `stale_before`.
    pub fn is_stale_claim(&self, stale_before: DateTime<Utc>) -> bool {
        self.status == ScheduleStatus::Processing && self.updated_at < stale_before
    }
}

/// State written back after a schedule was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    /// `sent` for one-shot schedules, `pending` for recurring ones.
    pub status: ScheduleStatus,
    /// Unchanged for one-shot schedules, advanced otherwise.
    pub scheduled_for: DateTime<Utc>,
    /// Dispatch time.
    pub last_sent_at: DateTime<Utc>,
}
