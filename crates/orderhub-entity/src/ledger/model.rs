//! Challenge progress (commission ledger entry) model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use orderhub_core::types::id::UserId;

/// Goal given to a ledger entry when it is lazily created.
pub const DEFAULT_GOAL: i32 = 20;

/// Per-volunteer accumulator of commission-eligible units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChallengeProgress {
    /// The volunteer this entry belongs to (unique).
    pub volunteer_id: UserId,
    /// Units currently counted toward the goal. Never negative.
    pub confirmed_units: i32,
    /// Target number of units.
    pub goal: i32,
    /// When the entry was last adjusted.
    pub updated_at: DateTime<Utc>,
}

/// A signed change to one volunteer's confirmed units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDelta {
    /// The volunteer whose entry is adjusted.
    pub volunteer_id: UserId,
    /// Units to add (positive) or remove (negative).
    pub delta: i32,
}

impl ChallengeProgress {
    /// Compute the entry that results from applying `delta`.
    ///
    /// Returns `None` when there is nothing to write: no entry exists and
    /// the delta does not add units.
    pub fn adjusted(
        existing: Option<&ChallengeProgress>,
        volunteer_id: UserId,
        delta: i32,
        default_goal: i32,
        now: DateTime<Utc>,
    ) -> Option<ChallengeProgress> {
        match existing {
            Some(entry) => Some(ChallengeProgress {
                confirmed_units: entry.confirmed_units.saturating_add(delta).max(0),
                updated_at: now,
                ..entry.clone()
            }),
            None if delta > 0 => Some(ChallengeProgress {
                volunteer_id,
                confirmed_units: delta,
                goal: default_goal,
                updated_at: now,
            }),
            None => None,
        }
    }

    /// Check whether the volunteer has met the goal.
    pub fn goal_reached(&self) -> bool {
        self.confirmed_units >= self.goal
    }

    /// Units still needed to reach the goal.
    pub fn remaining(&self) -> i32 {
        (self.goal - self.confirmed_units).max(0)
    }
}
