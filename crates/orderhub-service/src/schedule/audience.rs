//! Audience resolution for scheduled notifications.

use std::collections::HashSet;
use std::sync::Arc;

use orderhub_core::result::AppResult;
use orderhub_core::types::id::UserId;
use orderhub_database::store::DirectoryStore;
use orderhub_entity::schedule::TargetFilter;
use orderhub_entity::user::{Recipient, UserRole};

/// Turns a [`TargetFilter`] into concrete recipients.
#[derive(Clone)]
pub struct AudienceResolver {
    directory: Arc<dyn DirectoryStore>,
}

impl std::fmt::Debug for AudienceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudienceResolver").finish()
    }
}

impl AudienceResolver {
    /// Creates a resolver over the user directory.
    pub fn new(directory: Arc<dyn DirectoryStore>) -> Self {
        Self { directory }
    }

    /// Resolve the recipients of `filter`. Each user appears at most once.
    pub async fn resolve(&self, filter: &TargetFilter) -> AppResult<Vec<Recipient>> {
        let recipients: Vec<Recipient> = match filter {
            TargetFilter::All => {
                let customers = self.directory.ids_for_role(UserRole::Customer).await?;
                let volunteers = self.directory.ids_for_role(UserRole::Volunteer).await?;
                tag(customers, UserRole::Customer)
                    .chain(tag(volunteers, UserRole::Volunteer))
                    .collect()
            }
            TargetFilter::Role { role } => {
                tag(self.directory.ids_for_role(*role).await?, *role).collect()
            }
            TargetFilter::Individual { user_ids, role } => {
                tag(user_ids.iter().copied(), *role).collect()
            }
            TargetFilter::Filtered { zone, order_status } => {
                let mut volunteers = self.directory.volunteers(zone.as_deref()).await?;
                if let Some(status) = order_status {
                    let linked: HashSet<UserId> = self
                        .directory
                        .volunteers_with_order_status(*status)
                        .await?
                        .into_iter()
                        .collect();
                    volunteers.retain(|id| linked.contains(id));
                }
                tag(volunteers, UserRole::Volunteer).collect()
            }
        };
        Ok(dedup(recipients))
    }
}

fn tag(ids: impl IntoIterator<Item = UserId>, role: UserRole) -> impl Iterator<Item = Recipient> {
    ids.into_iter().map(move |id| Recipient::new(id, role))
}

/// Keep the first occurrence of each user.
fn dedup(recipients: Vec<Recipient>) -> Vec<Recipient> {
    let mut seen = HashSet::new();
    recipients
        .into_iter()
        .filter(|r| seen.insert(r.user_id))
        .collect()
}
