//! Ledger reads and manual adjustments.

use std::sync::Arc;

use tracing::info;

use orderhub_core::error::AppError;
use orderhub_core::result::AppResult;
use orderhub_core::types::id::UserId;
use orderhub_database::store::LedgerStore;
use orderhub_entity::ledger::{ChallengeProgress, LedgerDelta};

/// Reads and adjusts per-volunteer challenge progress.
///
/// Status-driven adjustments happen inside the order transition; this
/// service covers reads and corrections made outside an order write.
#[derive(Clone)]
pub struct LedgerService {
    ledger: Arc<dyn LedgerStore>,
}

impl std::fmt::Debug for LedgerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerService").finish()
    }
}

impl LedgerService {
    /// Creates a new ledger service.
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    /// A volunteer's progress.
    pub async fn get(&self, volunteer_id: UserId) -> AppResult<ChallengeProgress> {
        self.ledger
            .get(volunteer_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No progress for volunteer {volunteer_id}")))
    }

    /// Apply a manual delta.
    ///
    /// No entry and a non-positive delta is a no-op and returns `None`.
    pub async fn adjust(
        &self,
        volunteer_id: UserId,
        delta: i32,
    ) -> AppResult<Option<ChallengeProgress>> {
        let entry = self
            .ledger
            .adjust(LedgerDelta {
                volunteer_id,
                delta,
            })
            .await?;

        match &entry {
            Some(e) => info!(
                volunteer_id = %volunteer_id,
                delta,
                confirmed_units = e.confirmed_units,
                "Ledger adjusted"
            ),
            None => info!(volunteer_id = %volunteer_id, delta, "Ledger adjustment had no entry to apply to"),
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use orderhub_core::error::ErrorKind;
    use orderhub_database::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_adjust_follows_ledger_rules() {
        let service = LedgerService::new(Arc::new(MemoryStore::default()));
        let volunteer = UserId::new();

        assert!(service.adjust(volunteer, -2).await.unwrap().is_none());
        assert_eq!(service.get(volunteer).await.unwrap_err().kind, ErrorKind::NotFound);

        let created = service.adjust(volunteer, 5).await.unwrap().unwrap();
        assert_eq!((created.confirmed_units, created.goal), (5, 20));

        let clamped = service.adjust(volunteer, -9).await.unwrap().unwrap();
        assert_eq!(clamped.confirmed_units, 0);
        assert_eq!(service.get(volunteer).await.unwrap().confirmed_units, 0);
    }
}
