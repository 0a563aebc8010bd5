//! Notification repository implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use orderhub_core::error::{AppError, ErrorKind};
use orderhub_core::result::AppResult;
use orderhub_entity::notification::CreateNotification;

use crate::store::NotificationStore;

/// Rows per INSERT. Each row binds 9 parameters and Postgres caps a
/// statement at 65535.
const INSERT_CHUNK: usize = 5_000;

/// Repository for `notifications` rows.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn insert_many(&self, notifications: &[CreateNotification]) -> AppResult<u64> {
        if notifications.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut inserted = 0;
        for chunk in notifications.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
                "INSERT INTO notifications \
                 (user_id, user_role, title, message, action_url, priority, is_read, \
                  delivery_status, scheduled_notification_id) ",
            );
            builder.push_values(chunk, |mut row, n| {
                row.push_bind(n.user_id)
                    .push_bind(n.user_role)
                    .push_bind(&n.title)
                    .push_bind(&n.message)
                    .push_bind(&n.action_url)
                    .push_bind(&n.priority)
                    .push_bind(n.is_read)
                    .push_bind(&n.delivery_status)
                    .push_bind(n.scheduled_notification_id);
            });

            let result = builder.build().execute(&mut *tx).await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to insert notifications", e)
            })?;
            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit notifications", e)
        })?;

        Ok(inserted)
    }
}
