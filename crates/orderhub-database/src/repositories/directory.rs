//! Read-only user directory queries.

use async_trait::async_trait;
use sqlx::PgPool;

use orderhub_core::error::{AppError, ErrorKind};
use orderhub_core::result::AppResult;
use orderhub_core::types::id::UserId;
use orderhub_entity::order::OrderStatus;
use orderhub_entity::user::UserRole;

use crate::store::DirectoryStore;

/// Queries over `users` and `orders` for audience resolution.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    /// Create a new directory repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryStore for DirectoryRepository {
    async fn ids_for_role(&self, role: UserRole) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>("SELECT id FROM users WHERE role = $1 ORDER BY id")
            .bind(role)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users by role", e))
    }

    async fn volunteers(&self, zone: Option<&str>) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT id FROM users \
             WHERE role = 'volunteer' AND ($1::TEXT IS NULL OR zone = $1) \
             ORDER BY id",
        )
        .bind(zone)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list volunteers", e))
    }

    async fn volunteers_with_order_status(&self, status: OrderStatus) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT volunteer_id FROM ( \
                 SELECT referral_volunteer_id AS volunteer_id FROM orders \
                 WHERE status = $1 AND referral_volunteer_id IS NOT NULL \
                 UNION \
                 SELECT delivery_volunteer_id FROM orders \
                 WHERE status = $1 AND delivery_volunteer_id IS NOT NULL \
             ) linked ORDER BY volunteer_id",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list volunteers by order status", e)
        })
    }
}
