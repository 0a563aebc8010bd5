//! Order status reconciliation.
//!
//! A reconcile call reads the order, decides the ledger consequence of the
//! requested status, and persists the order update together with the
//! ledger delta through a guarded [`OrderTransition`]. If another writer
//! changed the status in between, the guard misses and the whole decision
//! is re-made from a fresh read.
//!
//! Notification and audit run after the commit. Their failures are logged
//! and never undo the committed change.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use orderhub_core::config::ReconcileConfig;
use orderhub_core::error::AppError;
use orderhub_core::result::AppResult;
use orderhub_core::types::id::{OrderId, UserId};
use orderhub_database::store::{OrderStore, OrderTransition};
use orderhub_entity::audit::CreateAuditLogEntry;
use orderhub_entity::ledger::LedgerDelta;
use orderhub_entity::order::{Order, OrderChanges, OrderStatus, OrderStatusChanged};

use super::delta::ledger_delta;
use crate::audit::AuditSink;
use crate::context::RequestContext;
use crate::notification::NotificationSink;

/// A requested change to one order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileRequest {
    /// The order to change.
    pub order_id: OrderId,
    /// Requested status, as received. Parsed before anything is read.
    pub status: Option<String>,
    /// Volunteer to credit and to assign as deliverer.
    pub volunteer_id: Option<UserId>,
    /// Replacement admin notes.
    pub notes: Option<String>,
    /// Replacement delivery address.
    pub delivery_address: Option<String>,
}

/// What one attempt decided to write.
#[derive(Debug)]
struct Plan {
    transition: OrderTransition,
    /// Set only when the status actually changes.
    new_status: Option<OrderStatus>,
    target_volunteer: Option<UserId>,
    delta: i32,
}

impl Plan {
    fn new(order: &Order, changes: &OrderChanges) -> Self {
        let previous = order.status;
        let new_status = changes.status.filter(|s| Some(*s) != previous);

        // The most recently supplied volunteer wins over the referrer.
        let target_volunteer = changes.delivery_volunteer_id.or(order.referral_volunteer_id);
        let delta = new_status.map_or(0, |s| ledger_delta(previous, s, order.quantity));

        let ledger = match (delta, target_volunteer) {
            (0, _) => None,
            (delta, Some(volunteer_id)) => Some(LedgerDelta {
                volunteer_id,
                delta,
            }),
            (delta, None) => {
                warn!(
                    order_id = %order.id,
                    delta,
                    "Status change moves ledger units but the order has no volunteer"
                );
                None
            }
        };

        Self {
            transition: OrderTransition {
                order_id: order.id,
                expected_status: previous,
                changes: changes.clone(),
                ledger,
            },
            new_status,
            target_volunteer,
            delta: ledger.map_or(0, |l| l.delta),
        }
    }
}

/// Applies status changes and keeps the commission ledger in step.
#[derive(Clone)]
pub struct OrderReconciler {
    orders: Arc<dyn OrderStore>,
    notifier: Arc<dyn NotificationSink>,
    audit: Arc<dyn AuditSink>,
    max_attempts: u32,
    side_effect_timeout: Duration,
}

impl std::fmt::Debug for OrderReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderReconciler")
            .field("max_attempts", &self.max_attempts)
            .field("side_effect_timeout", &self.side_effect_timeout)
            .finish()
    }
}

impl OrderReconciler {
    /// Creates a new reconciler.
    pub fn new(
        orders: Arc<dyn OrderStore>,
        notifier: Arc<dyn NotificationSink>,
        audit: Arc<dyn AuditSink>,
        config: &ReconcileConfig,
    ) -> Self {
        Self {
            orders,
            notifier,
            audit,
            max_attempts: config.max_attempts.max(1),
            side_effect_timeout: Duration::from_millis(config.side_effect_timeout_ms),
        }
    }

    /// Apply `request` and return the updated order.
    ///
    /// # Errors
    ///
    /// - `Validation` if nothing is being updated or the status is unknown.
    /// - `NotFound` if the order does not exist.
    /// - `Conflict` if concurrent writers kept winning for every attempt.
    /// - `Database` if the order write failed; nothing was changed.
    pub async fn reconcile(
        &self,
        ctx: &RequestContext,
        request: ReconcileRequest,
    ) -> AppResult<Order> {
        let changes = OrderChanges {
            status: request
                .status
                .as_deref()
                .map(str::parse::<OrderStatus>)
                .transpose()?,
            delivery_volunteer_id: request.volunteer_id,
            notes: request.notes,
            delivery_address: request.delivery_address,
        };
        if changes.is_empty() {
            return Err(AppError::validation("No updatable field supplied"));
        }

        let order_id = request.order_id;
        for attempt in 1..=self.max_attempts {
            let order = self
                .orders
                .find_order(order_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

            let plan = Plan::new(&order, &changes);
            match self.orders.apply_transition(&plan.transition).await? {
                Some(updated) => {
                    info!(
                        order_id = %order_id,
                        previous_status = ?order.status,
                        status = ?updated.status,
                        ledger_delta = plan.delta,
                        volunteer_id = ?plan.target_volunteer,
                        "Order reconciled"
                    );
                    self.after_commit(ctx, &order, &updated, &plan).await;
                    return Ok(updated);
                }
                None => {
                    debug!(order_id = %order_id, attempt, "Order changed concurrently, retrying");
                }
            }
        }

        warn!(
            order_id = %order_id,
            attempts = self.max_attempts,
            "Giving up on order update after repeated conflicts"
        );
        Err(AppError::conflict(format!(
            "Order {order_id} was modified concurrently; retry the request"
        )))
    }

    async fn after_commit(&self, ctx: &RequestContext, before: &Order, after: &Order, plan: &Plan) {
        if let Some(new_status) = plan.new_status {
            let event = OrderStatusChanged {
                order_id: after.id,
                previous_status: before.status,
                new_status,
                customer_id: after.customer_id,
                volunteer_id: plan.target_volunteer,
                occurred_at: after.updated_at,
            };
            self.best_effort("notification", after.id, self.notifier.notify_status_change(&event))
                .await;
        }

        let entry = audit_entry(ctx, before, plan);
        self.best_effort("audit", after.id, self.audit.record(entry)).await;
    }

    async fn best_effort<F>(&self, side_effect: &'static str, order_id: OrderId, fut: F)
    where
        F: Future<Output = AppResult<()>>,
    {
        match tokio::time::timeout(self.side_effect_timeout, fut).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(
                order_id = %order_id,
                side_effect,
                error = %e,
                "Order side effect failed; change is kept"
            ),
            Err(_) => warn!(
                order_id = %order_id,
                side_effect,
                timeout_ms = self.side_effect_timeout.as_millis() as u64,
                "Order side effect timed out; change is kept"
            ),
        }
    }
}

fn audit_entry(ctx: &RequestContext, before: &Order, plan: &Plan) -> CreateAuditLogEntry {
    let changes = &plan.transition.changes;
    let mut changed = Map::new();
    if let Some(status) = changes.status {
        changed.insert("status".into(), json!(status));
    }
    if let Some(volunteer) = changes.delivery_volunteer_id {
        changed.insert("volunteer_id".into(), json!(volunteer));
    }
    if let Some(notes) = &changes.notes {
        changed.insert("notes".into(), json!(notes));
    }
    if let Some(address) = &changes.delivery_address {
        changed.insert("delivery_address".into(), json!(address));
    }

    let action = if plan.new_status.is_some() {
        "order.status_change"
    } else {
        "order.update"
    };

    CreateAuditLogEntry {
        actor_id: ctx.actor_id,
        action: action.to_string(),
        entity_type: "order".to_string(),
        entity_id: Some(before.id.into_uuid()),
        details: Some(json!({
            "changes": Value::Object(changed),
            "previous_status": before.status,
            "ledger_delta": plan.delta,
            "ledger_volunteer_id": plan.transition.ledger.map(|l| l.volunteer_id),
        })),
        ip_address: ctx.ip_address.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use orderhub_core::error::ErrorKind;
    use orderhub_database::MemoryStore;
    use orderhub_entity::audit::AuditLogEntry;

    use super::*;
    use crate::audit::StoreAuditSink;
    use crate::notification::{NoopNotificationSink, RecordingNotificationSink};

    struct Harness {
        store: MemoryStore,
        notifier: Arc<RecordingNotificationSink>,
        reconciler: OrderReconciler,
    }

    fn harness_with(notifier: RecordingNotificationSink) -> Harness {
        let store = MemoryStore::default();
        let notifier = Arc::new(notifier);
        let reconciler = OrderReconciler::new(
            Arc::new(store.clone()),
            notifier.clone(),
            Arc::new(StoreAuditSink::new(Arc::new(store.clone()))),
            &ReconcileConfig::default(),
        );
        Harness {
            store,
            notifier,
            reconciler,
        }
    }

    fn harness() -> Harness {
        harness_with(RecordingNotificationSink::default())
    }

    fn set_status(order_id: OrderId, status: &str) -> ReconcileRequest {
        ReconcileRequest {
            order_id,
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    async fn seed(h: &Harness, qty: i32, status: Option<OrderStatus>) -> (Order, UserId) {
        let volunteer = UserId::new();
        let mut order = Order::new(UserId::new(), Some(volunteer), qty);
        order.status = status;
        h.store.insert_order(order.clone()).await;
        (order, volunteer)
    }

    async fn units(h: &Harness, volunteer: UserId) -> Option<i32> {
        h.store.ledger_entry(volunteer).await.map(|e| e.confirmed_units)
    }

    #[tokio::test]
    async fn test_first_status_activates_ledger_with_default_goal() {
        let h = harness();
        let (order, volunteer) = seed(&h, 3, None).await;

        let updated = h
            .reconciler
            .reconcile(&RequestContext::system(), set_status(order.id, "pending"))
            .await
            .unwrap();

        assert_eq!(updated.status, Some(OrderStatus::Pending));
        let entry = h.store.ledger_entry(volunteer).await.unwrap();
        assert_eq!(entry.confirmed_units, 3);
        assert_eq!(entry.goal, 20);
    }

    #[tokio::test]
    async fn test_same_status_is_idempotent() {
        let h = harness();
        let (order, volunteer) = seed(&h, 3, None).await;
        let ctx = RequestContext::system();

        h.reconciler
            .reconcile(&ctx, set_status(order.id, "confirmed"))
            .await
            .unwrap();
        h.reconciler
            .reconcile(&ctx, set_status(order.id, "confirmed"))
            .await
            .unwrap();

        assert_eq!(units(&h, volunteer).await, Some(3));
        assert_eq!(h.notifier.events.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_then_confirm_round_trips_ledger() {
        let h = harness();
        let (order, volunteer) = seed(&h, 4, Some(OrderStatus::Pending)).await;
        h.store
            .insert_ledger_entry(orderhub_entity::ledger::ChallengeProgress {
                volunteer_id: volunteer,
                confirmed_units: 4,
                goal: 20,
                updated_at: Utc::now(),
            })
            .await;
        let ctx = RequestContext::system();

        h.reconciler
            .reconcile(&ctx, set_status(order.id, "cancelled"))
            .await
            .unwrap();
        assert_eq!(units(&h, volunteer).await, Some(0));

        h.reconciler
            .reconcile(&ctx, set_status(order.id, "confirmed"))
            .await
            .unwrap();
        assert_eq!(units(&h, volunteer).await, Some(4));
    }

    #[tokio::test]
    async fn test_pending_to_confirmed_moves_no_units() {
        let h = harness();
        let (order, volunteer) = seed(&h, 3, Some(OrderStatus::Pending)).await;
        h.store
            .insert_ledger_entry(orderhub_entity::ledger::ChallengeProgress {
                volunteer_id: volunteer,
                confirmed_units: 0,
                goal: 20,
                updated_at: Utc::now(),
            })
            .await;

        let updated = h
            .reconciler
            .reconcile(&RequestContext::system(), set_status(order.id, "confirmed"))
            .await
            .unwrap();

        assert_eq!(updated.status, Some(OrderStatus::Confirmed));
        assert_eq!(units(&h, volunteer).await, Some(0));
        let events = h.notifier.events.lock().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].previous_status, Some(OrderStatus::Pending));
        assert_eq!(events[0].new_status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_deactivation_without_entry_is_noop() {
        let h = harness();
        let (order, volunteer) = seed(&h, 2, Some(OrderStatus::Confirmed)).await;

        h.reconciler
            .reconcile(&RequestContext::system(), set_status(order.id, "cant_reach"))
            .await
            .unwrap();

        assert_eq!(units(&h, volunteer).await, None);
    }

    #[tokio::test]
    async fn test_units_never_go_negative() {
        let h = harness();
        let (order, volunteer) = seed(&h, 5, Some(OrderStatus::Delivered)).await;
        h.store
            .insert_ledger_entry(orderhub_entity::ledger::ChallengeProgress {
                volunteer_id: volunteer,
                confirmed_units: 2,
                goal: 20,
                updated_at: Utc::now(),
            })
            .await;

        h.reconciler
            .reconcile(&RequestContext::system(), set_status(order.id, "cancelled"))
            .await
            .unwrap();

        assert_eq!(units(&h, volunteer).await, Some(0));
    }

    #[tokio::test]
    async fn test_same_class_change_touches_status_only() {
        let h = harness();
        let (order, volunteer) = seed(&h, 2, Some(OrderStatus::Pending)).await;

        let updated = h
            .reconciler
            .reconcile(&RequestContext::system(), set_status(order.id, "delivered"))
            .await
            .unwrap();

        assert_eq!(updated.status, Some(OrderStatus::Delivered));
        assert_eq!(units(&h, volunteer).await, None);
        // The status changed, so the dispatcher still hears about it.
        assert_eq!(h.notifier.events.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_supplied_volunteer_is_credited_and_assigned() {
        let h = harness();
        let (order, referrer) = seed(&h, 3, Some(OrderStatus::Cancelled)).await;
        let deliverer = UserId::new();

        let updated = h
            .reconciler
            .reconcile(
                &RequestContext::system(),
                ReconcileRequest {
                    volunteer_id: Some(deliverer),
                    ..set_status(order.id, "confirmed")
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.delivery_volunteer_id, Some(deliverer));
        assert_eq!(units(&h, deliverer).await, Some(3));
        assert_eq!(units(&h, referrer).await, None);

        let events = h.notifier.events.lock().await;
        assert_eq!(events[0].volunteer_id, Some(deliverer));
        assert_eq!(events[0].customer_id, order.customer_id);
    }

    #[tokio::test]
    async fn test_order_without_volunteer_skips_ledger() {
        let h = harness();
        let order = Order::new(UserId::new(), None, 3);
        h.store.insert_order(order.clone()).await;

        let updated = h
            .reconciler
            .reconcile(&RequestContext::system(), set_status(order.id, "confirmed"))
            .await
            .unwrap();

        assert_eq!(updated.status, Some(OrderStatus::Confirmed));
        assert!(h.notifier.events.lock().await[0].volunteer_id.is_none());
    }

    #[tokio::test]
    async fn test_validation_errors_come_before_any_read() {
        let h = harness();
        let missing = OrderId::new();

        let empty = h
            .reconciler
            .reconcile(
                &RequestContext::system(),
                ReconcileRequest {
                    order_id: missing,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(empty.kind, ErrorKind::Validation);

        let malformed = h
            .reconciler
            .reconcile(&RequestContext::system(), set_status(missing, "shipped"))
            .await
            .unwrap_err();
        assert_eq!(malformed.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_missing_order_is_not_found() {
        let h = harness();
        let err = h
            .reconciler
            .reconcile(&RequestContext::system(), set_status(OrderId::new(), "pending"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_field_only_update_is_audited_without_notification() {
        let h = harness();
        let (order, volunteer) = seed(&h, 2, Some(OrderStatus::Pending)).await;
        let actor = UserId::new();
        let ctx = RequestContext::new(Some(actor), Some("10.0.0.7".to_string()));

        let updated = h
            .reconciler
            .reconcile(
                &ctx,
                ReconcileRequest {
                    order_id: order.id,
                    notes: Some("call before delivery".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.notes.as_deref(), Some("call before delivery"));
        assert_eq!(updated.status, Some(OrderStatus::Pending));
        assert!(h.notifier.events.lock().await.is_empty());
        assert_eq!(units(&h, volunteer).await, None);

        let audit: Vec<AuditLogEntry> = h.store.audit_entries().await;
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action, "order.update");
        assert_eq!(audit[0].actor_id, Some(actor));
        assert_eq!(audit[0].ip_address.as_deref(), Some("10.0.0.7"));
        let details = audit[0].details.as_ref().unwrap();
        assert_eq!(details["changes"]["notes"], "call before delivery");
        assert_eq!(details["ledger_delta"], 0);
    }

    #[tokio::test]
    async fn test_status_change_audit_records_delta() {
        let h = harness();
        let (order, _) = seed(&h, 3, Some(OrderStatus::Cancelled)).await;

        h.reconciler
            .reconcile(&RequestContext::system(), set_status(order.id, "pending"))
            .await
            .unwrap();

        let audit = h.store.audit_entries().await;
        assert_eq!(audit[0].action, "order.status_change");
        assert_eq!(audit[0].entity_type, "order");
        assert_eq!(audit[0].entity_id, Some(order.id.into_uuid()));
        let details = audit[0].details.as_ref().unwrap();
        assert_eq!(details["changes"]["status"], "pending");
        assert_eq!(details["previous_status"], "cancelled");
        assert_eq!(details["ledger_delta"], 3);
    }

    #[tokio::test]
    async fn test_dispatcher_failure_does_not_roll_back() {
        let h = harness_with(RecordingNotificationSink::failing());
        let (order, volunteer) = seed(&h, 3, Some(OrderStatus::Pending)).await;

        let updated = h
            .reconciler
            .reconcile(&RequestContext::system(), set_status(order.id, "cancelled"))
            .await
            .unwrap();

        assert_eq!(updated.status, Some(OrderStatus::Cancelled));
        assert_eq!(
            h.store.order(order.id).await.unwrap().status,
            Some(OrderStatus::Cancelled)
        );
        assert_eq!(units(&h, volunteer).await, None);
        // Audit still runs after a failed dispatch.
        assert_eq!(h.store.audit_entries().await.len(), 1);
    }

    struct FailingAudit;

    #[async_trait]
    impl AuditSink for FailingAudit {
        async fn record(&self, _entry: CreateAuditLogEntry) -> AppResult<()> {
            Err(AppError::external("audit log unavailable"))
        }
    }

    #[tokio::test]
    async fn test_audit_failure_is_swallowed() {
        let store = MemoryStore::default();
        let reconciler = OrderReconciler::new(
            Arc::new(store.clone()),
            Arc::new(NoopNotificationSink),
            Arc::new(FailingAudit),
            &ReconcileConfig::default(),
        );
        let order = Order::new(UserId::new(), Some(UserId::new()), 1);
        store.insert_order(order.clone()).await;

        let updated = reconciler
            .reconcile(&RequestContext::system(), set_status(order.id, "confirmed"))
            .await
            .unwrap();
        assert_eq!(updated.status, Some(OrderStatus::Confirmed));
    }

    struct SlowAudit;

    #[async_trait]
    impl AuditSink for SlowAudit {
        async fn record(&self, _entry: CreateAuditLogEntry) -> AppResult<()> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_side_effect_is_abandoned() {
        let store = MemoryStore::default();
        let reconciler = OrderReconciler::new(
            Arc::new(store.clone()),
            Arc::new(NoopNotificationSink),
            Arc::new(SlowAudit),
            &ReconcileConfig {
                max_attempts: 3,
                side_effect_timeout_ms: 100,
            },
        );
        let order = Order::new(UserId::new(), Some(UserId::new()), 1);
        store.insert_order(order.clone()).await;

        let updated = reconciler
            .reconcile(&RequestContext::system(), set_status(order.id, "confirmed"))
            .await
            .unwrap();
        assert_eq!(updated.status, Some(OrderStatus::Confirmed));
    }

    /// Fails every order write.
    struct BrokenOrders(MemoryStore);

    #[async_trait]
    impl OrderStore for BrokenOrders {
        async fn find_order(&self, id: OrderId) -> AppResult<Option<Order>> {
            self.0.find_order(id).await
        }

        async fn apply_transition(&self, _t: &OrderTransition) -> AppResult<Option<Order>> {
            Err(AppError::database("connection reset"))
        }

        async fn active_units_by_referrer(&self) -> AppResult<Vec<(UserId, i64)>> {
            self.0.active_units_by_referrer().await
        }

        async fn volunteers_with_delivery_assignments(&self) -> AppResult<Vec<UserId>> {
            self.0.volunteers_with_delivery_assignments().await
        }
    }

    #[tokio::test]
    async fn test_persistence_error_propagates_without_side_effects() {
        let store = MemoryStore::default();
        let notifier = Arc::new(RecordingNotificationSink::default());
        let reconciler = OrderReconciler::new(
            Arc::new(BrokenOrders(store.clone())),
            notifier.clone(),
            Arc::new(StoreAuditSink::new(Arc::new(store.clone()))),
            &ReconcileConfig::default(),
        );
        let volunteer = UserId::new();
        let order = Order::new(UserId::new(), Some(volunteer), 2);
        store.insert_order(order.clone()).await;

        let err = reconciler
            .reconcile(&RequestContext::system(), set_status(order.id, "confirmed"))
            .await
            .unwrap_err();

        assert!(err.is_persistence());
        assert!(store.ledger_entry(volunteer).await.is_none());
        assert!(notifier.events.lock().await.is_empty());
        assert!(store.audit_entries().await.is_empty());
    }

    /// Lets a competing writer confirm the order right after the first read,
    /// so the first guarded write misses.
    struct RacingOrders {
        inner: MemoryStore,
        raced: AtomicBool,
        writes: AtomicU32,
    }

    #[async_trait]
    impl OrderStore for RacingOrders {
        async fn find_order(&self, id: OrderId) -> AppResult<Option<Order>> {
            let order = self.inner.find_order(id).await?;
            if let Some(order) = &order {
                if !self.raced.swap(true, Ordering::SeqCst) {
                    let competitor = Plan::new(
                        order,
                        &OrderChanges {
                            status: Some(OrderStatus::Confirmed),
                            ..Default::default()
                        },
                    );
                    self.inner.apply_transition(&competitor.transition).await?;
                }
            }
            Ok(order)
        }

        async fn apply_transition(&self, t: &OrderTransition) -> AppResult<Option<Order>> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.apply_transition(t).await
        }

        async fn active_units_by_referrer(&self) -> AppResult<Vec<(UserId, i64)>> {
            self.inner.active_units_by_referrer().await
        }

        async fn volunteers_with_delivery_assignments(&self) -> AppResult<Vec<UserId>> {
            self.inner.volunteers_with_delivery_assignments().await
        }
    }

    #[tokio::test]
    async fn test_lost_race_rereads_and_adds_once() {
        let store = MemoryStore::default();
        let racing = Arc::new(RacingOrders {
            inner: store.clone(),
            raced: AtomicBool::new(false),
            writes: AtomicU32::new(0),
        });
        let notifier = Arc::new(RecordingNotificationSink::default());
        let reconciler = OrderReconciler::new(
            racing.clone(),
            notifier.clone(),
            Arc::new(StoreAuditSink::new(Arc::new(store.clone()))),
            &ReconcileConfig::default(),
        );
        let volunteer = UserId::new();
        let order = Order::new(UserId::new(), Some(volunteer), 3).with_status(OrderStatus::Pending);
        store.insert_order(order.clone()).await;
        // The pending order already counts.
        store
            .insert_ledger_entry(orderhub_entity::ledger::ChallengeProgress {
                volunteer_id: volunteer,
                confirmed_units: 3,
                goal: 20,
                updated_at: Utc::now(),
            })
            .await;

        let updated = reconciler
            .reconcile(&RequestContext::system(), set_status(order.id, "cancelled"))
            .await
            .unwrap();

        // Second attempt saw `confirmed` (active) and still removed the units once.
        assert_eq!(updated.status, Some(OrderStatus::Cancelled));
        assert_eq!(racing.writes.load(Ordering::SeqCst), 2);
        assert_eq!(store.ledger_entry(volunteer).await.unwrap().confirmed_units, 0);
        let events = notifier.events.lock().await;
        assert_eq!(events[0].previous_status, Some(OrderStatus::Confirmed));
    }

    /// Every guarded write misses.
    struct AlwaysStale(MemoryStore);

    #[async_trait]
    impl OrderStore for AlwaysStale {
        async fn find_order(&self, id: OrderId) -> AppResult<Option<Order>> {
            self.0.find_order(id).await
        }

        async fn apply_transition(&self, _t: &OrderTransition) -> AppResult<Option<Order>> {
            Ok(None)
        }

        async fn active_units_by_referrer(&self) -> AppResult<Vec<(UserId, i64)>> {
            self.0.active_units_by_referrer().await
        }

        async fn volunteers_with_delivery_assignments(&self) -> AppResult<Vec<UserId>> {
            self.0.volunteers_with_delivery_assignments().await
        }
    }

    #[tokio::test]
    async fn test_exhausted_retries_report_conflict() {
        let store = MemoryStore::default();
        let reconciler = OrderReconciler::new(
            Arc::new(AlwaysStale(store.clone())),
            Arc::new(NoopNotificationSink),
            Arc::new(StoreAuditSink::new(Arc::new(store.clone()))),
            &ReconcileConfig::default(),
        );
        let order = Order::new(UserId::new(), None, 1);
        store.insert_order(order.clone()).await;

        let err = reconciler
            .reconcile(&RequestContext::system(), set_status(order.id, "confirmed"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(store.audit_entries().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_double_confirm_adds_once() {
        let h = harness();
        let (order, volunteer) = seed(&h, 3, Some(OrderStatus::Cancelled)).await;

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let reconciler = h.reconciler.clone();
                tokio::spawn(async move {
                    reconciler
                        .reconcile(&RequestContext::system(), set_status(order.id, "confirmed"))
                        .await
                })
            })
            .collect();
        for task in futures::future::join_all(tasks).await {
            task.unwrap().unwrap();
        }

        assert_eq!(units(&h, volunteer).await, Some(3));
        assert_eq!(h.notifier.events.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_end_to_end_pending_then_cancelled() {
        let h = harness();
        let (order, volunteer) = seed(&h, 3, None).await;
        let ctx = RequestContext::system();

        assert_eq!(units(&h, volunteer).await, None);
        h.reconciler
            .reconcile(&ctx, set_status(order.id, "pending"))
            .await
            .unwrap();
        assert_eq!(units(&h, volunteer).await, Some(3));
        h.reconciler
            .reconcile(&ctx, set_status(order.id, "cancelled"))
            .await
            .unwrap();
        assert_eq!(units(&h, volunteer).await, Some(0));
    }
}
