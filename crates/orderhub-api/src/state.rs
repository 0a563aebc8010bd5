//! Application state shared across all handlers.

use std::sync::Arc;

use orderhub_core::config::AppConfig;
use orderhub_database::Stores;
use orderhub_service::{
    AudienceResolver, DEFAULT_CLAIM_LEASE, LedgerConsistencyChecker, LedgerService, OrderReconciler,
    ScheduledNotificationProcessor, StoreAuditSink, StoreNotificationSink,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Store bundle (PostgreSQL or in-memory)
    pub stores: Stores,

    // ── Services ─────────────────────────────────────────────
    /// Order status reconciler
    pub reconciler: Arc<OrderReconciler>,
    /// Scheduled notification processor
    pub processor: Arc<ScheduledNotificationProcessor>,
    /// Ledger reads and adjustments
    pub ledger_service: Arc<LedgerService>,
    /// Ledger consistency checker
    pub ledger_checker: Arc<LedgerConsistencyChecker>,
}

impl AppState {
    /// Wire every service on top of `stores`.
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        let notifier = Arc::new(StoreNotificationSink::new(Arc::clone(&stores.notifications)));
        let audit = Arc::new(StoreAuditSink::new(Arc::clone(&stores.audit)));

        let reconciler = Arc::new(OrderReconciler::new(
            Arc::clone(&stores.orders),
            notifier.clone(),
            audit,
            &config.reconcile,
        ));
        let processor = Arc::new(ScheduledNotificationProcessor::new(
            Arc::clone(&stores.schedules),
            AudienceResolver::new(Arc::clone(&stores.directory)),
            notifier,
        )
        .with_claim_lease(
            i64::try_from(config.worker.claim_lease_seconds)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .unwrap_or(DEFAULT_CLAIM_LEASE),
        ));
        let ledger_service = Arc::new(LedgerService::new(Arc::clone(&stores.ledger)));
        let ledger_checker = Arc::new(LedgerConsistencyChecker::new(
            Arc::clone(&stores.orders),
            Arc::clone(&stores.ledger),
            config.ledger.auto_repair,
        ));

        Self {
            config: Arc::new(config),
            stores,
            reconciler,
            processor,
            ledger_service,
            ledger_checker,
        }
    }
}
