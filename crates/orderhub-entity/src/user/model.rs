//! Directory rows used for audience resolution.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use orderhub_core::types::id::UserId;

use super::role::UserRole;

/// A user as seen by audience resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DirectoryUser {
    /// User identifier.
    pub id: UserId,
    /// The user's role.
    pub role: UserRole,
    /// Service zone (volunteers only).
    pub zone: Option<String>,
}

/// A resolved notification recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient {
    /// Recipient user.
    pub user_id: UserId,
    /// Role the notification is addressed to.
    pub role: UserRole,
}

impl Recipient {
    /// Create a recipient.
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }
}
