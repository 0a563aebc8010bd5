//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderhub_core::types::id::UserId;
use orderhub_entity::ledger::ChallengeProgress;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// A volunteer's challenge progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressResponse {
    /// Volunteer.
    pub volunteer_id: UserId,
    /// Units counted.
    pub confirmed_units: i32,
    /// Goal.
    pub goal: i32,
    /// Units still needed.
    pub remaining: i32,
    /// Whether the goal is met.
    pub goal_reached: bool,
    /// Last adjustment.
    pub updated_at: DateTime<Utc>,
}

impl From<ChallengeProgress> for ProgressResponse {
    fn from(entry: ChallengeProgress) -> Self {
        Self {
            remaining: entry.remaining(),
            goal_reached: entry.goal_reached(),
            volunteer_id: entry.volunteer_id,
            confirmed_units: entry.confirmed_units,
            goal: entry.goal,
            updated_at: entry.updated_at,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Database status.
    pub database: String,
    /// Version.
    pub version: String,
}
