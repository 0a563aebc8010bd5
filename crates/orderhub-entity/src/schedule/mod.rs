//! Scheduled (recurring) notification entities.

pub mod model;
pub mod status;
pub mod target;

pub use model::{ScheduleOutcome, ScheduledNotification};
pub use status::{Recurrence, ScheduleStatus};
pub use target::TargetFilter;
