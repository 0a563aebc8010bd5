//! Ledger consistency check.
//!
//! Recomputes what each referral volunteer's ledger should hold from the
//! orders themselves and reports (or repairs) entries that drifted, e.g.
//! after a side write failed outside a transaction or after manual edits.
//!
//! Status changes that name a delivery volunteer credit that volunteer
//! instead of the referrer, which the referrer-based recount cannot see.
//! Drift on any volunteer involved in such an order is reported as held
//! and never overwritten.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use orderhub_core::result::AppResult;
use orderhub_core::types::id::UserId;
use orderhub_database::store::{LedgerStore, OrderStore};

/// Outcome of one consistency pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerCheckReport {
    /// Volunteers examined.
    pub checked: usize,
    /// Volunteers whose entry disagreed with their orders.
    pub drifted: usize,
    /// Drifted entries overwritten.
    pub repaired: usize,
    /// Drifted entries left alone because delivery assignments make the
    /// recount unreliable for them.
    pub held: usize,
}

/// Compares ledger entries against active order quantities.
#[derive(Clone)]
pub struct LedgerConsistencyChecker {
    orders: Arc<dyn OrderStore>,
    ledger: Arc<dyn LedgerStore>,
    auto_repair: bool,
}

impl std::fmt::Debug for LedgerConsistencyChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerConsistencyChecker")
            .field("auto_repair", &self.auto_repair)
            .finish()
    }
}

impl LedgerConsistencyChecker {
    /// Creates a new checker. With `auto_repair`, drifted entries are
    /// overwritten with the recomputed value.
    pub fn new(
        orders: Arc<dyn OrderStore>,
        ledger: Arc<dyn LedgerStore>,
        auto_repair: bool,
    ) -> Self {
        Self {
            orders,
            ledger,
            auto_repair,
        }
    }

    /// Run one pass.
    ///
    /// Expected units per volunteer are the sum of `quantity` over orders in
    /// an active status that name the volunteer as referrer. A volunteer with
    /// expected units but no entry counts as drifted.
    pub async fn check(&self) -> AppResult<LedgerCheckReport> {
        let mut expected: BTreeMap<Uuid, (UserId, i64)> = self
            .orders
            .active_units_by_referrer()
            .await?
            .into_iter()
            .map(|(id, units)| (id.into_uuid(), (id, units)))
            .collect();

        let assigned: HashSet<UserId> = self
            .orders
            .volunteers_with_delivery_assignments()
            .await?
            .into_iter()
            .collect();

        let mut report = LedgerCheckReport::default();
        let mut drift: Vec<(UserId, i64)> = Vec::new();

        for entry in self.ledger.list_all().await? {
            report.checked += 1;
            let want = expected
                .remove(entry.volunteer_id.as_uuid())
                .map_or(0, |(_, units)| units);
            if i64::from(entry.confirmed_units) != want {
                warn!(
                    volunteer_id = %entry.volunteer_id,
                    recorded = entry.confirmed_units,
                    expected = want,
                    "Ledger drift detected"
                );
                drift.push((entry.volunteer_id, want));
            }
        }

        for (volunteer_id, want) in expected.into_values() {
            report.checked += 1;
            if want > 0 {
                warn!(
                    volunteer_id = %volunteer_id,
                    expected = want,
                    "Ledger entry missing for volunteer with active orders"
                );
                drift.push((volunteer_id, want));
            }
        }

        report.drifted = drift.len();
        drift.retain(|(volunteer_id, want)| {
            if !assigned.contains(volunteer_id) {
                return true;
            }
            warn!(
                volunteer_id = %volunteer_id,
                expected = want,
                "Ledger drift held: volunteer has delivery assignments"
            );
            report.held += 1;
            false
        });

        if self.auto_repair {
            for (volunteer_id, want) in drift {
                let units = i32::try_from(want).unwrap_or(i32::MAX);
                self.ledger.set_units(volunteer_id, units).await?;
                report.repaired += 1;
            }
        }

        info!(
            checked = report.checked,
            drifted = report.drifted,
            repaired = report.repaired,
            held = report.held,
            auto_repair = self.auto_repair,
            "Ledger consistency check completed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use orderhub_core::config::ReconcileConfig;
    use orderhub_database::MemoryStore;
    use orderhub_entity::ledger::ChallengeProgress;
    use orderhub_entity::order::{Order, OrderStatus};

    use super::*;
    use crate::audit::NoopAuditSink;
    use crate::context::RequestContext;
    use crate::notification::NoopNotificationSink;
    use crate::order::{OrderReconciler, ReconcileRequest};

    fn entry(volunteer_id: UserId, units: i32) -> ChallengeProgress {
        ChallengeProgress {
            volunteer_id,
            confirmed_units: units,
            goal: 20,
            updated_at: Utc::now(),
        }
    }

    async fn seeded() -> (MemoryStore, UserId, UserId, UserId) {
        let store = MemoryStore::default();
        let consistent = UserId::new();
        let overcounted = UserId::new();
        let missing = UserId::new();

        for (volunteer, qty, status) in [
            (consistent, 2, OrderStatus::Confirmed),
            (consistent, 1, OrderStatus::Cancelled),
            (overcounted, 3, OrderStatus::Pending),
            (missing, 4, OrderStatus::Delivered),
        ] {
            store
                .insert_order(Order::new(UserId::new(), Some(volunteer), qty).with_status(status))
                .await;
        }
        store.insert_ledger_entry(entry(consistent, 2)).await;
        store.insert_ledger_entry(entry(overcounted, 7)).await;

        (store, consistent, overcounted, missing)
    }

    #[tokio::test]
    async fn test_reports_drift_without_repairing() {
        let (store, _, overcounted, missing) = seeded().await;
        let checker =
            LedgerConsistencyChecker::new(Arc::new(store.clone()), Arc::new(store.clone()), false);

        let report = checker.check().await.unwrap();

        assert_eq!(
            report,
            LedgerCheckReport {
                checked: 3,
                drifted: 2,
                repaired: 0,
                held: 0
            }
        );
        assert_eq!(store.ledger_entry(overcounted).await.unwrap().confirmed_units, 7);
        assert!(store.ledger_entry(missing).await.is_none());
    }

    #[tokio::test]
    async fn test_auto_repair_overwrites_drifted_entries() {
        let (store, consistent, overcounted, missing) = seeded().await;
        let checker =
            LedgerConsistencyChecker::new(Arc::new(store.clone()), Arc::new(store.clone()), true);

        let report = checker.check().await.unwrap();
        assert_eq!(report.repaired, 2);

        assert_eq!(store.ledger_entry(consistent).await.unwrap().confirmed_units, 2);
        assert_eq!(store.ledger_entry(overcounted).await.unwrap().confirmed_units, 3);
        assert_eq!(store.ledger_entry(missing).await.unwrap().confirmed_units, 4);

        let again = checker.check().await.unwrap();
        assert_eq!(again.drifted, 0);
    }

    #[tokio::test]
    async fn test_entry_without_active_orders_should_be_zero() {
        let store = MemoryStore::default();
        let volunteer = UserId::new();
        store.insert_ledger_entry(entry(volunteer, 5)).await;
        let checker =
            LedgerConsistencyChecker::new(Arc::new(store.clone()), Arc::new(store.clone()), true);

        let report = checker.check().await.unwrap();

        assert_eq!(report.drifted, 1);
        assert_eq!(store.ledger_entry(volunteer).await.unwrap().confirmed_units, 0);
    }

    #[tokio::test]
    async fn test_delivery_volunteer_credit_is_held_not_repaired() {
        let store = MemoryStore::default();
        let (referrer, courier) = (UserId::new(), UserId::new());
        let order = Order::new(UserId::new(), Some(referrer), 3);
        store.insert_order(order.clone()).await;
        let reconciler = OrderReconciler::new(
            Arc::new(store.clone()),
            Arc::new(NoopNotificationSink),
            Arc::new(NoopAuditSink),
            &ReconcileConfig::default(),
        );
        reconciler
            .reconcile(
                &RequestContext::system(),
                ReconcileRequest {
                    order_id: order.id,
                    status: Some("confirmed".into()),
                    volunteer_id: Some(courier),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let checker =
            LedgerConsistencyChecker::new(Arc::new(store.clone()), Arc::new(store.clone()), true);

        let report = checker.check().await.unwrap();

        assert_eq!(
            report,
            LedgerCheckReport {
                checked: 2,
                drifted: 2,
                repaired: 0,
                held: 2
            }
        );
        assert_eq!(store.ledger_entry(courier).await.unwrap().confirmed_units, 3);
        assert!(store.ledger_entry(referrer).await.is_none());
    }

    #[tokio::test]
    async fn test_held_volunteers_do_not_block_other_repairs() {
        let (store, _, overcounted, _) = seeded().await;
        let (referrer, courier) = (UserId::new(), UserId::new());
        let mut order =
            Order::new(UserId::new(), Some(referrer), 1).with_status(OrderStatus::Pending);
        order.delivery_volunteer_id = Some(courier);
        store.insert_order(order).await;
        store.insert_ledger_entry(entry(courier, 1)).await;
        let checker =
            LedgerConsistencyChecker::new(Arc::new(store.clone()), Arc::new(store.clone()), true);

        let report = checker.check().await.unwrap();

        assert_eq!(report.repaired, 2);
        assert_eq!(report.held, 2);
        assert_eq!(store.ledger_entry(overcounted).await.unwrap().confirmed_units, 3);
        assert_eq!(store.ledger_entry(courier).await.unwrap().confirmed_units, 1);
    }
}
