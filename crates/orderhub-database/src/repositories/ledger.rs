//! Commission ledger repository implementation.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use orderhub_core::error::{AppError, ErrorKind};
use orderhub_core::result::AppResult;
use orderhub_core::types::id::UserId;
use orderhub_entity::ledger::{ChallengeProgress, LedgerDelta};

use crate::store::LedgerStore;

/// Repository for `challenge_progress` rows.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: PgPool,
    default_goal: i32,
}

impl LedgerRepository {
    /// Create a new ledger repository. `default_goal` is used for lazily
    /// created entries.
    pub fn new(pool: PgPool, default_goal: i32) -> Self {
        Self { pool, default_goal }
    }
}

/// Apply a delta on an open connection or transaction.
///
/// A positive delta upserts; anything else only touches an existing row.
pub(crate) async fn adjust_on(
    conn: &mut PgConnection,
    delta: LedgerDelta,
    default_goal: i32,
) -> AppResult<Option<ChallengeProgress>> {
    let result = if delta.delta > 0 {
        sqlx::query_as::<_, ChallengeProgress>(
            "INSERT INTO challenge_progress (volunteer_id, confirmed_units, goal, updated_at) \
             VALUES ($1, $2, $3, NOW()) \
             ON CONFLICT (volunteer_id) DO UPDATE \
             SET confirmed_units = GREATEST(0, challenge_progress.confirmed_units + EXCLUDED.confirmed_units), \
                 updated_at = NOW() \
             RETURNING *",
        )
        .bind(delta.volunteer_id)
        .bind(delta.delta)
        .bind(default_goal)
        .fetch_optional(&mut *conn)
        .await
    } else {
        sqlx::query_as::<_, ChallengeProgress>(
            "UPDATE challenge_progress \
             SET confirmed_units = GREATEST(0, confirmed_units + $2), updated_at = NOW() \
             WHERE volunteer_id = $1 RETURNING *",
        )
        .bind(delta.volunteer_id)
        .bind(delta.delta)
        .fetch_optional(&mut *conn)
        .await
    };

    result.map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to adjust ledger", e))
}

#[async_trait]
impl LedgerStore for LedgerRepository {
    async fn get(&self, volunteer_id: UserId) -> AppResult<Option<ChallengeProgress>> {
        sqlx::query_as::<_, ChallengeProgress>(
            "SELECT * FROM challenge_progress WHERE volunteer_id = $1",
        )
        .bind(volunteer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load ledger entry", e))
    }

    async fn adjust(&self, delta: LedgerDelta) -> AppResult<Option<ChallengeProgress>> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })?;
        adjust_on(&mut conn, delta, self.default_goal).await
    }

    async fn list_all(&self) -> AppResult<Vec<ChallengeProgress>> {
        sqlx::query_as::<_, ChallengeProgress>(
            "SELECT * FROM challenge_progress ORDER BY volunteer_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list ledger", e))
    }

    async fn set_units(&self, volunteer_id: UserId, units: i32) -> AppResult<ChallengeProgress> {
        sqlx::query_as::<_, ChallengeProgress>(
            "INSERT INTO challenge_progress (volunteer_id, confirmed_units, goal, updated_at) \
             VALUES ($1, GREATEST(0, $2), $3, NOW()) \
             ON CONFLICT (volunteer_id) DO UPDATE \
             SET confirmed_units = EXCLUDED.confirmed_units, updated_at = NOW() \
             RETURNING *",
        )
        .bind(volunteer_id)
        .bind(units)
        .bind(self.default_goal)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to overwrite ledger", e))
    }
}
