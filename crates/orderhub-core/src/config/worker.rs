//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Cron-driven background worker configuration.
///
/// Cron expressions use the six-field form (seconds first) understood by
/// `tokio-cron-scheduler`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the in-process scheduler is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cadence for polling due scheduled notifications.
    #[serde(default = "default_notifications_cron")]
    pub scheduled_notifications_cron: String,
    /// Cadence for the ledger consistency check.
    #[serde(default = "default_ledger_check_cron")]
    pub ledger_check_cron: String,
    /// Seconds a `processing` claim is held before another pass may take
    /// the entry over.
    #[serde(default = "default_claim_lease_seconds")]
    pub claim_lease_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            scheduled_notifications_cron: default_notifications_cron(),
            ledger_check_cron: default_ledger_check_cron(),
            claim_lease_seconds: default_claim_lease_seconds(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_notifications_cron() -> String {
    "0 * * * * *".to_string()
}

fn default_ledger_check_cron() -> String {
    "0 30 3 * * *".to_string()
}

fn default_claim_lease_seconds() -> u64 {
    900
}
