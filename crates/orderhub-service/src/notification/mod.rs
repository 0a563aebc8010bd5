//! Notification dispatch.

pub mod sink;

pub use sink::{NoopNotificationSink, NotificationSink, StoreNotificationSink};

#[cfg(test)]
pub(crate) use sink::RecordingNotificationSink;
