//! External cron trigger configuration.

use serde::{Deserialize, Serialize};

/// Settings for the HTTP endpoint an external scheduler calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CronTriggerConfig {
    /// Shared secret expected as a bearer token. `None` leaves the endpoint open.
    #[serde(default)]
    pub secret: Option<String>,
}
