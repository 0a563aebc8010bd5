//! Scheduled notification processing.

pub mod audience;
pub mod processor;
pub mod recurrence;

pub use audience::AudienceResolver;
pub use processor::{DEFAULT_CLAIM_LEASE, ProcessSummary, ScheduledNotificationProcessor};
pub use recurrence::next_occurrence;
