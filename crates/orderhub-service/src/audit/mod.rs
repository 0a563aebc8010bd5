//! Audit recording.

pub mod sink;

pub use sink::{AuditSink, NoopAuditSink, StoreAuditSink};
