//! In-memory stores using a Tokio mutex for single-node deployments.
//!
//! Every trait method takes the one lock for its whole duration, so each
//! call is atomic with respect to every other call. That is what makes
//! guarded transitions and claims safe here.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use orderhub_core::error::AppError;
use orderhub_core::result::AppResult;
use orderhub_core::types::id::{AuditLogId, OrderId, ScheduledNotificationId, UserId};
use orderhub_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use orderhub_entity::ledger::{ChallengeProgress, DEFAULT_GOAL, LedgerDelta};
use orderhub_entity::notification::{CreateNotification, Notification};
use orderhub_entity::order::{Order, OrderStatus};
use orderhub_entity::schedule::{ScheduleOutcome, ScheduleStatus, ScheduledNotification};
use orderhub_entity::user::{DirectoryUser, UserRole};

use crate::store::{
    AuditStore, DirectoryStore, LedgerStore, NotificationStore, OrderStore, OrderTransition,
    ScheduleStore,
};

#[derive(Debug, Default)]
struct MemoryState {
    orders: HashMap<OrderId, Order>,
    ledger: HashMap<UserId, ChallengeProgress>,
    schedules: HashMap<ScheduledNotificationId, ScheduledNotification>,
    users: Vec<DirectoryUser>,
    notifications: Vec<Notification>,
    audit: Vec<AuditLogEntry>,
}

impl MemoryState {
    fn adjust(
        &mut self,
        delta: LedgerDelta,
        default_goal: i32,
        now: DateTime<Utc>,
    ) -> Option<ChallengeProgress> {
        let next = ChallengeProgress::adjusted(
            self.ledger.get(&delta.volunteer_id),
            delta.volunteer_id,
            delta.delta,
            default_goal,
            now,
        )?;
        self.ledger.insert(delta.volunteer_id, next.clone());
        Some(next)
    }
}

/// Process-local implementation of every store trait.
///
/// Cloning shares the same underlying state.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    default_goal: i32,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_GOAL)
    }
}

impl MemoryStore {
    /// Create an empty store. `default_goal` is used for lazily created
    /// ledger entries.
    pub fn new(default_goal: i32) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            default_goal,
        }
    }

    /// Insert or replace an order.
    pub async fn insert_order(&self, order: Order) {
        self.state.lock().await.orders.insert(order.id, order);
    }

    /// Read an order.
    pub async fn order(&self, id: OrderId) -> Option<Order> {
        self.state.lock().await.orders.get(&id).cloned()
    }

    /// Add a directory user.
    pub async fn insert_user(&self, user: DirectoryUser) {
        self.state.lock().await.users.push(user);
    }

    /// Insert or replace a scheduled notification.
    pub async fn insert_schedule(&self, schedule: ScheduledNotification) {
        self.state.lock().await.schedules.insert(schedule.id, schedule);
    }

    /// Read a scheduled notification.
    pub async fn schedule(&self, id: ScheduledNotificationId) -> Option<ScheduledNotification> {
        self.state.lock().await.schedules.get(&id).cloned()
    }

    /// Insert or replace a ledger entry.
    pub async fn insert_ledger_entry(&self, entry: ChallengeProgress) {
        self.state.lock().await.ledger.insert(entry.volunteer_id, entry);
    }

    /// Read a ledger entry.
    pub async fn ledger_entry(&self, volunteer_id: UserId) -> Option<ChallengeProgress> {
        self.state.lock().await.ledger.get(&volunteer_id).cloned()
    }

    /// Every notification written so far, in insertion order.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.lock().await.notifications.clone()
    }

    /// Every audit entry written so far, in insertion order.
    pub async fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.state.lock().await.audit.clone()
    }
}

fn sorted(mut ids: Vec<UserId>) -> Vec<UserId> {
    ids.sort_by_key(|id| id.into_uuid());
    ids.dedup();
    ids
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn find_order(&self, id: OrderId) -> AppResult<Option<Order>> {
        Ok(self.order(id).await)
    }

    async fn apply_transition(&self, transition: &OrderTransition) -> AppResult<Option<Order>> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        let Some(order) = state.orders.get_mut(&transition.order_id) else {
            return Ok(None);
        };
        if order.status != transition.expected_status {
            debug!(order_id = %transition.order_id, "Guarded order update matched no row");
            return Ok(None);
        }

        transition.changes.apply_to(order, now);
        let updated = order.clone();

        if let Some(delta) = transition.ledger {
            state.adjust(delta, self.default_goal, now);
        }

        Ok(Some(updated))
    }

    async fn active_units_by_referrer(&self) -> AppResult<Vec<(UserId, i64)>> {
        let state = self.state.lock().await;
        let mut totals: HashMap<UserId, i64> = HashMap::new();
        for order in state.orders.values() {
            let Some(referrer) = order.referral_volunteer_id else {
                continue;
            };
            if order.status.is_some_and(|s| s.is_active()) {
                *totals.entry(referrer).or_default() += i64::from(order.quantity);
            }
        }
        let mut totals: Vec<_> = totals.into_iter().collect();
        totals.sort_by_key(|(id, _)| id.into_uuid());
        Ok(totals)
    }

    async fn volunteers_with_delivery_assignments(&self) -> AppResult<Vec<UserId>> {
        let state = self.state.lock().await;
        let mut ids: HashSet<UserId> = HashSet::new();
        for order in state.orders.values() {
            let Some(assigned) = order.delivery_volunteer_id else {
                continue;
            };
            if order.referral_volunteer_id == Some(assigned) {
                continue;
            }
            ids.insert(assigned);
            ids.extend(order.referral_volunteer_id);
        }
        let mut ids: Vec<_> = ids.into_iter().collect();
        ids.sort_by_key(|id| id.into_uuid());
        Ok(ids)
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get(&self, volunteer_id: UserId) -> AppResult<Option<ChallengeProgress>> {
        Ok(self.ledger_entry(volunteer_id).await)
    }

    async fn adjust(&self, delta: LedgerDelta) -> AppResult<Option<ChallengeProgress>> {
        let mut state = self.state.lock().await;
        Ok(state.adjust(delta, self.default_goal, Utc::now()))
    }

    async fn list_all(&self) -> AppResult<Vec<ChallengeProgress>> {
        let state = self.state.lock().await;
        let mut entries: Vec<_> = state.ledger.values().cloned().collect();
        entries.sort_by_key(|e| e.volunteer_id.into_uuid());
        Ok(entries)
    }

    async fn set_units(&self, volunteer_id: UserId, units: i32) -> AppResult<ChallengeProgress> {
        let mut state = self.state.lock().await;
        let default_goal = self.default_goal;
        let entry = state
            .ledger
            .entry(volunteer_id)
            .or_insert_with(|| ChallengeProgress {
                volunteer_id,
                confirmed_units: 0,
                goal: default_goal,
                updated_at: Utc::now(),
            });
        entry.confirmed_units = units.max(0);
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> AppResult<Vec<ScheduledNotification>> {
        let mut state = self.state.lock().await;
        let mut claimed: Vec<ScheduledNotification> = state
            .schedules
            .values_mut()
            .filter(|s| s.is_due(now) || s.is_stale_claim(stale_before))
            .map(|s| {
                s.status = ScheduleStatus::Processing;
                s.updated_at = now;
                s.clone()
            })
            .collect();
        claimed.sort_by_key(|s| s.scheduled_for);
        Ok(claimed)
    }

    async fn complete(
        &self,
        id: ScheduledNotificationId,
        outcome: &ScheduleOutcome,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let schedule = state
            .schedules
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Scheduled notification {id} not found")))?;
        schedule.status = outcome.status;
        schedule.scheduled_for = outcome.scheduled_for;
        schedule.last_sent_at = Some(outcome.last_sent_at);
        schedule.error_message = None;
        schedule.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_failed(&self, id: ScheduledNotificationId, error: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let schedule = state
            .schedules
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Scheduled notification {id} not found")))?;
        schedule.status = ScheduleStatus::Failed;
        schedule.error_message = Some(error.to_string());
        schedule.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn ids_for_role(&self, role: UserRole) -> AppResult<Vec<UserId>> {
        let state = self.state.lock().await;
        Ok(sorted(
            state.users.iter().filter(|u| u.role == role).map(|u| u.id).collect(),
        ))
    }

    async fn volunteers(&self, zone: Option<&str>) -> AppResult<Vec<UserId>> {
        let state = self.state.lock().await;
        Ok(sorted(
            state
                .users
                .iter()
                .filter(|u| u.role == UserRole::Volunteer)
                .filter(|u| zone.is_none_or(|z| u.zone.as_deref() == Some(z)))
                .map(|u| u.id)
                .collect(),
        ))
    }

    async fn volunteers_with_order_status(&self, status: OrderStatus) -> AppResult<Vec<UserId>> {
        let state = self.state.lock().await;
        let linked: HashSet<UserId> = state
            .orders
            .values()
            .filter(|o| o.status == Some(status))
            .flat_map(|o| [o.referral_volunteer_id, o.delivery_volunteer_id])
            .flatten()
            .collect();
        Ok(sorted(linked.into_iter().collect()))
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_many(&self, notifications: &[CreateNotification]) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        state.notifications.extend(
            notifications
                .iter()
                .cloned()
                .map(|n| n.into_notification(now)),
        );
        Ok(notifications.len() as u64)
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn create(&self, entry: &CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        let row = AuditLogEntry {
            id: AuditLogId::new(),
            actor_id: entry.actor_id,
            action: entry.action.clone(),
            entity_type: entry.entity_type.clone(),
            entity_id: entry.entity_id,
            details: entry.details.clone(),
            ip_address: entry.ip_address.clone(),
            created_at: Utc::now(),
        };
        self.state.lock().await.audit.push(row.clone());
        Ok(row)
    }
}
