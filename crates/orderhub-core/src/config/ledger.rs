//! Commission ledger configuration.

use serde::{Deserialize, Serialize};

/// Commission ledger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Goal assigned to a ledger entry when it is first created.
    #[serde(default = "default_goal")]
    pub default_goal: i32,
    /// Whether the consistency check overwrites drifted entries.
    #[serde(default)]
    pub auto_repair: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_goal: default_goal(),
            auto_repair: false,
        }
    }
}

fn default_goal() -> i32 {
    20
}
