//! Order repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use orderhub_core::error::{AppError, ErrorKind};
use orderhub_core::result::AppResult;
use orderhub_core::types::id::{OrderId, UserId};
use orderhub_entity::order::Order;

use super::ledger::adjust_on;
use crate::store::{OrderStore, OrderTransition};

/// Repository for `orders` rows.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: PgPool,
    default_goal: i32,
}

impl OrderRepository {
    /// Create a new order repository. `default_goal` is used when a
    /// transition lazily creates a ledger entry.
    pub fn new(pool: PgPool, default_goal: i32) -> Self {
        Self { pool, default_goal }
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn find_order(&self, id: OrderId) -> AppResult<Option<Order>> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find order", e))
    }

    async fn apply_transition(&self, transition: &OrderTransition) -> AppResult<Option<Order>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let changes = &transition.changes;
        let updated = sqlx::query_as::<_, Order>(
            "UPDATE orders SET \
                status = COALESCE($3, status), \
                delivery_volunteer_id = COALESCE($4, delivery_volunteer_id), \
                notes = COALESCE($5, notes), \
                delivery_address = COALESCE($6, delivery_address), \
                updated_at = NOW() \
             WHERE id = $1 AND status IS NOT DISTINCT FROM $2 \
             RETURNING *",
        )
        .bind(transition.order_id)
        .bind(transition.expected_status)
        .bind(changes.status)
        .bind(changes.delivery_volunteer_id)
        .bind(&changes.notes)
        .bind(&changes.delivery_address)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update order", e))?;

        let Some(order) = updated else {
            debug!(order_id = %transition.order_id, "Guarded order update matched no row");
            return Ok(None);
        };

        if let Some(delta) = transition.ledger {
            adjust_on(&mut tx, delta, self.default_goal).await?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit order transition", e)
        })?;

        Ok(Some(order))
    }

    async fn active_units_by_referrer(&self) -> AppResult<Vec<(UserId, i64)>> {
        sqlx::query_as::<_, (UserId, i64)>(
            "SELECT referral_volunteer_id, COALESCE(SUM(quantity), 0)::BIGINT \
             FROM orders \
             WHERE referral_volunteer_id IS NOT NULL \
               AND status IN ('pending', 'confirmed', 'delivered') \
             GROUP BY referral_volunteer_id \
             ORDER BY referral_volunteer_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to sum active order units", e)
        })
    }

    async fn volunteers_with_delivery_assignments(&self) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT volunteer_id FROM ( \
                 SELECT delivery_volunteer_id AS volunteer_id FROM orders \
                 WHERE delivery_volunteer_id IS NOT NULL \
                   AND delivery_volunteer_id IS DISTINCT FROM referral_volunteer_id \
                 UNION \
                 SELECT referral_volunteer_id FROM orders \
                 WHERE referral_volunteer_id IS NOT NULL \
                   AND delivery_volunteer_id IS NOT NULL \
                   AND delivery_volunteer_id <> referral_volunteer_id \
             ) assigned ORDER BY volunteer_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to list volunteers with delivery assignments",
                e,
            )
        })
    }
}
