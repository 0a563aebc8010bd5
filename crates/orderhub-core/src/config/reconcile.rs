//! Order status reconciliation configuration.

use serde::{Deserialize, Serialize};

/// Settings for the order status reconciler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Attempts at the conditional status update before reporting a conflict.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Upper bound on each notification/audit side effect, in milliseconds.
    #[serde(default = "default_side_effect_timeout")]
    pub side_effect_timeout_ms: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            side_effect_timeout_ms: default_side_effect_timeout(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_side_effect_timeout() -> u64 {
    5000
}
