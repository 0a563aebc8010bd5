//! Request context carrying the acting user and request origin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderhub_core::types::id::UserId;

/// Who is acting, and from where.
///
/// Built by the HTTP layer (or the CLI) and passed into service methods so
/// the audit trail can attribute every change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user. `None` for system-initiated work.
    pub actor_id: Option<UserId>,
    /// IP address of the request origin.
    pub ip_address: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for a request.
    pub fn new(actor_id: Option<UserId>, ip_address: Option<String>) -> Self {
        Self {
            actor_id,
            ip_address,
            request_time: Utc::now(),
        }
    }

    /// Context for work the system does on its own behalf.
    pub fn system() -> Self {
        Self::new(None, None)
    }
}
