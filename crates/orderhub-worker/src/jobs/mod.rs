//! Built-in job handler implementations.

pub mod ledger;
pub mod notification;

pub use ledger::LedgerCheckJob;
pub use notification::ScheduledNotificationJob;
