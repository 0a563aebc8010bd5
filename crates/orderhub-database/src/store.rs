//! Store traits the services are written against.
//!
//! Two implementations exist: the PostgreSQL repositories in
//! [`crate::repositories`] and the process-local [`crate::MemoryStore`].
//! Both must give the same guarantees:
//!
//! - [`OrderStore::apply_transition`] writes the order and its ledger delta
//!   as one unit, and only if the stored status still equals the status the
//!   caller read.
//! - [`ScheduleStore::claim_due`] hands each due entry to exactly one caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderhub_core::result::AppResult;
use orderhub_core::types::id::{OrderId, ScheduledNotificationId, UserId};
use orderhub_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use orderhub_entity::ledger::{ChallengeProgress, LedgerDelta};
use orderhub_entity::notification::CreateNotification;
use orderhub_entity::order::{Order, OrderChanges, OrderStatus};
use orderhub_entity::schedule::{ScheduleOutcome, ScheduledNotification};
use orderhub_entity::user::UserRole;

/// A guarded order write with its ledger side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTransition {
    /// The order being written.
    pub order_id: OrderId,
    /// Status the caller observed. The write only applies if the stored
    /// status is still this value (`NULL` compares equal to `NULL`).
    pub expected_status: Option<OrderStatus>,
    /// Field updates.
    pub changes: OrderChanges,
    /// Ledger adjustment committed together with the order, if any.
    pub ledger: Option<LedgerDelta>,
}

/// Order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    /// Load an order by id.
    async fn find_order(&self, id: OrderId) -> AppResult<Option<Order>>;

    /// Apply a guarded transition.
    ///
    /// Returns `Ok(None)` when the order's status no longer matches
    /// `expected_status` (or the order vanished); nothing is written in
    /// that case.
    async fn apply_transition(&self, transition: &OrderTransition) -> AppResult<Option<Order>>;

    /// Sum of `quantity` over orders in active statuses, grouped by
    /// referral volunteer.
    async fn active_units_by_referrer(&self) -> AppResult<Vec<(UserId, i64)>>;

    /// Volunteers on either side of an order whose delivery volunteer is
    /// someone other than its referrer, ordered by id.
    async fn volunteers_with_delivery_assignments(&self) -> AppResult<Vec<UserId>>;
}

/// Commission ledger persistence.
#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    /// Load one volunteer's entry.
    async fn get(&self, volunteer_id: UserId) -> AppResult<Option<ChallengeProgress>>;

    /// Apply a delta outside an order transition.
    ///
    /// Returns the resulting entry, or `None` when there was nothing to
    /// adjust (no entry and a non-positive delta).
    async fn adjust(&self, delta: LedgerDelta) -> AppResult<Option<ChallengeProgress>>;

    /// Every entry, ordered by volunteer id.
    async fn list_all(&self) -> AppResult<Vec<ChallengeProgress>>;

    /// Overwrite an entry's units, creating it with the default goal if
    /// needed.
    async fn set_units(&self, volunteer_id: UserId, units: i32) -> AppResult<ChallengeProgress>;
}

/// Scheduled notification persistence.
#[async_trait]
pub trait ScheduleStore: Send + Sync + 'static {
    /// Atomically move every pending entry due at `now` to `processing`
    /// and return them, oldest first.
    ///
    /// Entries still `processing` whose claim was taken before
    /// `stale_before` belong to a pass that never finished; they are
    /// claimed again.
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> AppResult<Vec<ScheduledNotification>>;

    /// Record a successful dispatch.
    async fn complete(
        &self,
        id: ScheduledNotificationId,
        outcome: &ScheduleOutcome,
    ) -> AppResult<()>;

    /// Record a failed dispatch.
    async fn mark_failed(&self, id: ScheduledNotificationId, error: &str) -> AppResult<()>;
}

/// Read-only user directory used for audience resolution.
#[async_trait]
pub trait DirectoryStore: Send + Sync + 'static {
    /// Every user holding `role`.
    async fn ids_for_role(&self, role: UserRole) -> AppResult<Vec<UserId>>;

    /// Volunteers, optionally restricted to one zone.
    async fn volunteers(&self, zone: Option<&str>) -> AppResult<Vec<UserId>>;

    /// Volunteers linked (as referrer or deliverer) to at least one order
    /// in `status`.
    async fn volunteers_with_order_status(&self, status: OrderStatus) -> AppResult<Vec<UserId>>;
}

/// Notification persistence.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Insert all rows in one statement. Returns the number inserted.
    async fn insert_many(&self, notifications: &[CreateNotification]) -> AppResult<u64>;
}

/// Audit log persistence.
#[async_trait]
pub trait AuditStore: Send + Sync + 'static {
    /// Append an entry.
    async fn create(&self, entry: &CreateAuditLogEntry) -> AppResult<AuditLogEntry>;
}
