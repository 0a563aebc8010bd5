//! # orderhub-service
//!
//! Business logic for OrderHub. Services are written against the store
//! traits in `orderhub-database` and receive every dependency at
//! construction time via `Arc` references.
//!
//! - [`OrderReconciler`] moves orders through their lifecycle and keeps the
//!   commission ledger in step.
//! - [`ScheduledNotificationProcessor`] fires due scheduled notifications.
//! - [`LedgerConsistencyChecker`] detects (and optionally repairs) ledger
//!   drift.

pub mod audit;
pub mod context;
pub mod ledger;
pub mod notification;
pub mod order;
pub mod schedule;

pub use audit::{AuditSink, NoopAuditSink, StoreAuditSink};
pub use context::RequestContext;
pub use ledger::{LedgerCheckReport, LedgerConsistencyChecker, LedgerService};
pub use notification::{NoopNotificationSink, NotificationSink, StoreNotificationSink};
pub use order::{OrderReconciler, ReconcileRequest};
pub use schedule::{
    AudienceResolver, DEFAULT_CLAIM_LEASE, ProcessSummary, ScheduledNotificationProcessor,
};
