//! The bundle of stores handed to services, built from configuration.

use std::sync::Arc;

use tracing::{info, warn};

use orderhub_core::config::{DatabaseConfig, DatabaseProvider};
use orderhub_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::repositories::{
    AuditLogRepository, DirectoryRepository, LedgerRepository, NotificationRepository,
    OrderRepository, ScheduledNotificationRepository,
};
use crate::store::{
    AuditStore, DirectoryStore, LedgerStore, NotificationStore, OrderStore, ScheduleStore,
};

/// Every store, type-erased so services do not care about the backend.
#[derive(Clone)]
pub struct Stores {
    /// Orders.
    pub orders: Arc<dyn OrderStore>,
    /// Commission ledger.
    pub ledger: Arc<dyn LedgerStore>,
    /// Scheduled notifications.
    pub schedules: Arc<dyn ScheduleStore>,
    /// User directory.
    pub directory: Arc<dyn DirectoryStore>,
    /// Notifications.
    pub notifications: Arc<dyn NotificationStore>,
    /// Audit log.
    pub audit: Arc<dyn AuditStore>,
    pool: Option<DatabasePool>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("postgres", &self.pool.is_some())
            .finish_non_exhaustive()
    }
}

impl Stores {
    /// Build the configured backend.
    pub async fn connect(config: &DatabaseConfig, default_goal: i32) -> AppResult<Self> {
        match config.provider {
            DatabaseProvider::Postgres => {
                let pool = DatabasePool::connect(config).await?;
                Ok(Self::postgres(pool, default_goal))
            }
            DatabaseProvider::Memory => {
                warn!("Using in-memory stores; data is lost on restart");
                Ok(Self::memory(MemoryStore::new(default_goal)))
            }
        }
    }

    /// Stores backed by PostgreSQL repositories.
    pub fn postgres(pool: DatabasePool, default_goal: i32) -> Self {
        let pg = pool.pool().clone();
        info!("Order stores backed by PostgreSQL");
        Self {
            orders: Arc::new(OrderRepository::new(pg.clone(), default_goal)),
            ledger: Arc::new(LedgerRepository::new(pg.clone(), default_goal)),
            schedules: Arc::new(ScheduledNotificationRepository::new(pg.clone())),
            directory: Arc::new(DirectoryRepository::new(pg.clone())),
            notifications: Arc::new(NotificationRepository::new(pg.clone())),
            audit: Arc::new(AuditLogRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// Stores sharing one in-memory state.
    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            orders: store.clone(),
            ledger: store.clone(),
            schedules: store.clone(),
            directory: store.clone(),
            notifications: store.clone(),
            audit: store,
            pool: None,
        }
    }

    /// The PostgreSQL pool, when that backend is in use.
    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }

    /// Check the backend answers. The memory backend is always healthy.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }

    /// Close the PostgreSQL pool, if any.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
