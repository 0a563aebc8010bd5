//! Audience selection rules attached to a scheduled notification.

use serde::{Deserialize, Serialize};

use orderhub_core::types::id::UserId;

use crate::order::OrderStatus;
use crate::user::UserRole;

/// Which users a scheduled notification is sent to.
///
/// Stored as JSON, e.g.
/// `{"type": "individual", "userIds": ["..."], "role": "volunteer"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum TargetFilter {
    /// Every customer and every volunteer.
    All,
    /// Every user holding the role.
    Role {
        /// Target role.
        role: UserRole,
    },
    /// Exactly the listed users.
    Individual {
        /// Recipient ids.
        user_ids: Vec<UserId>,
        /// Role the recipients are addressed as.
        role: UserRole,
    },
    /// Volunteers narrowed by zone and/or order status.
    Filtered {
        /// Restrict to volunteers serving this zone.
        #[serde(default)]
        zone: Option<String>,
        /// Restrict to volunteers with at least one order in this status.
        #[serde(default)]
        order_status: Option<OrderStatus>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_individual_uses_camel_case_fields() {
        let id = UserId::new();
        let json = serde_json::json!({
            "type": "individual",
            "userIds": [id],
            "role": "volunteer"
        });
        let filter: TargetFilter = serde_json::from_value(json).unwrap();
        assert_eq!(
            filter,
            TargetFilter::Individual {
                user_ids: vec![id],
                role: UserRole::Volunteer
            }
        );
    }

    #[test]
    fn test_filtered_fields_are_optional() {
        let filter: TargetFilter =
            serde_json::from_value(serde_json::json!({"type": "filtered", "orderStatus": "cant_reach"}))
                .unwrap();
        assert_eq!(
            filter,
            TargetFilter::Filtered {
                zone: None,
                order_status: Some(OrderStatus::CantReach)
            }
        );
    }

    #[test]
    fn test_all_has_no_fields() {
        let filter: TargetFilter = serde_json::from_str(r#"{"type":"all"}"#).unwrap();
        assert_eq!(filter, TargetFilter::All);
    }
}
