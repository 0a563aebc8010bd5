//! Scheduled notification repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orderhub_core::error::{AppError, ErrorKind};
use orderhub_core::result::AppResult;
use orderhub_core::types::id::ScheduledNotificationId;
use orderhub_entity::schedule::{ScheduleOutcome, ScheduleStatus, ScheduledNotification};

use crate::store::ScheduleStore;

/// Repository for `scheduled_notifications` rows.
#[derive(Debug, Clone)]
pub struct ScheduledNotificationRepository {
    pool: PgPool,
}

impl ScheduledNotificationRepository {
    /// Create a new scheduled notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a schedule as authored.
    pub async fn create(&self, schedule: &ScheduledNotification) -> AppResult<ScheduledNotification> {
        sqlx::query_as::<_, ScheduledNotification>(
            "INSERT INTO scheduled_notifications \
             (id, title, message, action_url, priority, target_filters, recurrence, scheduled_for, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(schedule.id)
        .bind(&schedule.title)
        .bind(&schedule.message)
        .bind(&schedule.action_url)
        .bind(&schedule.priority)
        .bind(&schedule.target_filters)
        .bind(schedule.recurrence)
        .bind(schedule.scheduled_for)
        .bind(schedule.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create scheduled notification", e)
        })
    }
}

#[async_trait]
impl ScheduleStore for ScheduledNotificationRepository {
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> AppResult<Vec<ScheduledNotification>> {
        // SKIP LOCKED lets concurrent claimers partition the due set.
        let mut claimed = sqlx::query_as::<_, ScheduledNotification>(
            "UPDATE scheduled_notifications SET status = 'processing', updated_at = NOW() \
             WHERE id IN ( \
                 SELECT id FROM scheduled_notifications \
                 WHERE (status = 'pending' AND scheduled_for <= $1) \
                    OR (status = 'processing' AND updated_at < $2) \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING *",
        )
        .bind(now)
        .bind(stale_before)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to claim due notifications", e)
        })?;

        claimed.sort_by_key(|s| s.scheduled_for);
        Ok(claimed)
    }

    async fn complete(
        &self,
        id: ScheduledNotificationId,
        outcome: &ScheduleOutcome,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE scheduled_notifications \
             SET status = $2, scheduled_for = $3, last_sent_at = $4, error_message = NULL, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(outcome.status)
        .bind(outcome.scheduled_for)
        .bind(outcome.last_sent_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to complete scheduled notification", e)
        })?;
        Ok(())
    }

    async fn mark_failed(&self, id: ScheduledNotificationId, error: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE scheduled_notifications \
             SET status = $2, error_message = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(ScheduleStatus::Failed)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark notification failed", e)
        })?;
        Ok(())
    }
}
