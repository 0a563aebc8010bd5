//! Scheduled notification processor.
//!
//! One pass claims every due entry, then handles each claimed entry on its
//! own: resolve the audience, create the notifications, and write back the
//! next-run state. A failing entry is marked `failed` and the pass moves on.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use orderhub_core::result::AppResult;
use orderhub_database::store::ScheduleStore;
use orderhub_entity::notification::CreateNotification;
use orderhub_entity::schedule::{ScheduleOutcome, ScheduleStatus, ScheduledNotification};
use orderhub_entity::user::Recipient;

use super::audience::AudienceResolver;
use super::recurrence::next_occurrence;
use crate::notification::NotificationSink;

/// How long a claim is held before an unfinished entry is picked up again.
pub const DEFAULT_CLAIM_LEASE: Duration = Duration::minutes(15);

/// Result of one processing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSummary {
    /// Entries dispatched and rescheduled.
    pub processed_count: u32,
    /// Entries marked failed.
    pub error_count: u32,
}

/// Fires due scheduled notifications.
#[derive(Clone)]
pub struct ScheduledNotificationProcessor {
    schedules: Arc<dyn ScheduleStore>,
    resolver: AudienceResolver,
    notifier: Arc<dyn NotificationSink>,
    claim_lease: Duration,
}

impl std::fmt::Debug for ScheduledNotificationProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledNotificationProcessor")
            .field("claim_lease", &self.claim_lease)
            .finish()
    }
}

impl ScheduledNotificationProcessor {
    /// Creates a new processor.
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        resolver: AudienceResolver,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            schedules,
            resolver,
            notifier,
            claim_lease: DEFAULT_CLAIM_LEASE,
        }
    }

    /// Override the claim lease.
    pub fn with_claim_lease(mut self, lease: Duration) -> Self {
        self.claim_lease = lease;
        self
    }

    /// Process everything due at `now`.
    ///
    /// Only a failure to claim is returned as an error; per-entry failures
    /// are counted in [`ProcessSummary::error_count`].
    pub async fn process_due(&self, now: DateTime<Utc>) -> AppResult<ProcessSummary> {
        let claimed = self
            .schedules
            .claim_due(now, now - self.claim_lease)
            .await?;
        if claimed.is_empty() {
            debug!("No scheduled notifications due");
            return Ok(ProcessSummary::default());
        }

        info!(count = claimed.len(), "Processing due scheduled notifications");

        let mut summary = ProcessSummary::default();
        for entry in &claimed {
            match self.dispatch(entry, now).await {
                Ok(recipients) => {
                    summary.processed_count += 1;
                    info!(
                        schedule_id = %entry.id,
                        recurrence = ?entry.recurrence,
                        recipients,
                        "Scheduled notification sent"
                    );
                }
                Err(e) => {
                    summary.error_count += 1;
                    error!(
                        schedule_id = %entry.id,
                        error = %e,
                        "Scheduled notification failed"
                    );
                    if let Err(mark_err) = self.schedules.mark_failed(entry.id, &e.to_string()).await
                    {
                        error!(
                            schedule_id = %entry.id,
                            error = %mark_err,
                            "Failed to record scheduled notification failure"
                        );
                    }
                }
            }
        }

        info!(
            processed = summary.processed_count,
            errors = summary.error_count,
            "Scheduled notification pass completed"
        );
        Ok(summary)
    }

    /// Handle one claimed entry. Returns the number of recipients.
    async fn dispatch(&self, entry: &ScheduledNotification, now: DateTime<Utc>) -> AppResult<usize> {
        let target = entry.target()?;
        let recipients = self.resolver.resolve(&target).await?;

        if recipients.is_empty() {
            debug!(schedule_id = %entry.id, "Audience is empty; skipping dispatch");
        } else {
            let payloads: Vec<CreateNotification> =
                recipients.iter().map(|r| payload(entry, r)).collect();
            self.notifier.bulk_create(&payloads).await?;
        }

        let outcome = match next_occurrence(entry.recurrence, entry.scheduled_for)? {
            None => ScheduleOutcome {
                status: ScheduleStatus::Sent,
                scheduled_for: entry.scheduled_for,
                last_sent_at: now,
            },
            Some(next) => ScheduleOutcome {
                status: ScheduleStatus::Pending,
                scheduled_for: next,
                last_sent_at: now,
            },
        };
        self.schedules.complete(entry.id, &outcome).await?;

        Ok(recipients.len())
    }
}

fn payload(entry: &ScheduledNotification, recipient: &Recipient) -> CreateNotification {
    CreateNotification {
        action_url: entry.action_url.clone(),
        priority: entry.priority.clone(),
        scheduled_notification_id: Some(entry.id),
        ..CreateNotification::new(
            recipient.user_id,
            recipient.role,
            entry.title.clone(),
            entry.message.clone(),
        )
    }
}
