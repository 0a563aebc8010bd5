//! Order lifecycle reconciliation.

pub mod delta;
pub mod reconciler;

pub use delta::ledger_delta;
pub use reconciler::{OrderReconciler, ReconcileRequest};
