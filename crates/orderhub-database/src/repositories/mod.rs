//! PostgreSQL implementations of the store traits.

pub mod audit;
pub mod directory;
pub mod ledger;
pub mod notification;
pub mod order;
pub mod schedule;

pub use audit::AuditLogRepository;
pub use directory::DirectoryRepository;
pub use ledger::LedgerRepository;
pub use notification::NotificationRepository;
pub use order::OrderRepository;
pub use schedule::ScheduledNotificationRepository;
