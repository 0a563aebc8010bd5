//! The audit recorder seam and its implementations.

use std::sync::Arc;

use async_trait::async_trait;

use orderhub_core::result::AppResult;
use orderhub_database::store::AuditStore;
use orderhub_entity::audit::CreateAuditLogEntry;

/// Accepts audit entries. Callers treat failures as non-fatal.
#[async_trait]
pub trait AuditSink: Send + Sync + 'static {
    /// Record one entry.
    async fn record(&self, entry: CreateAuditLogEntry) -> AppResult<()>;
}

/// Appends to the audit store.
#[derive(Clone)]
pub struct StoreAuditSink {
    store: Arc<dyn AuditStore>,
}

impl std::fmt::Debug for StoreAuditSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreAuditSink").finish()
    }
}

impl StoreAuditSink {
    /// Creates a sink over `store`.
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuditSink for StoreAuditSink {
    async fn record(&self, entry: CreateAuditLogEntry) -> AppResult<()> {
        self.store.create(&entry).await.map(|_| ())
    }
}

/// Drops every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn record(&self, _entry: CreateAuditLogEntry) -> AppResult<()> {
        Ok(())
    }
}
