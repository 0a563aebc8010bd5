//! Schedule status and recurrence enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing state of a scheduled notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "schedule_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    /// Waiting for its due time.
    Pending,
    /// Claimed by a processor run.
    Processing,
    /// Dispatched; terminal for one-shot schedules.
    Sent,
    /// Processing failed; terminal.
    Failed,
}

impl ScheduleStatus {
    /// Check if no further processing will happen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sent | Self::Failed)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How often a scheduled notification re-fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "schedule_recurrence", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    /// Fire once.
    Once,
    /// Every day at the same time.
    Daily,
    /// Every seven days.
    Weekly,
    /// Same day of the next calendar month.
    Monthly,
}

impl Recurrence {
    /// Check if the schedule fires more than once.
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Self::Once)
    }

    /// Return the recurrence as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
