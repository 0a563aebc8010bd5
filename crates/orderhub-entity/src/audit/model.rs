//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use orderhub_core::types::id::{AuditLogId, UserId};

/// An immutable audit log entry recording an action on an entity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: AuditLogId,
    /// Who performed the action (`None` for system-initiated actions).
    pub actor_id: Option<UserId>,
    /// The action that was performed (e.g., `"order.status_change"`).
    pub action: String,
    /// The type of target entity (e.g., `"order"`).
    pub entity_type: String,
    /// The target entity ID.
    pub entity_id: Option<Uuid>,
    /// Changed fields and related details (JSON).
    pub details: Option<serde_json::Value>,
    /// IP address of the actor.
    pub ip_address: Option<String>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    /// Who performed the action.
    pub actor_id: Option<UserId>,
    /// The action performed.
    pub action: String,
    /// Target entity type.
    pub entity_type: String,
    /// Target entity ID.
    pub entity_id: Option<Uuid>,
    /// Additional details.
    pub details: Option<serde_json::Value>,
    /// Actor's IP address.
    pub ip_address: Option<String>,
}
