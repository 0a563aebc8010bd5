//! The notification dispatcher seam and its implementations.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use orderhub_core::result::AppResult;
use orderhub_database::store::NotificationStore;
use orderhub_entity::notification::CreateNotification;
use orderhub_entity::order::OrderStatusChanged;
use orderhub_entity::user::UserRole;

/// Receives order events and bulk notification payloads.
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    /// An order's status changed.
    async fn notify_status_change(&self, event: &OrderStatusChanged) -> AppResult<()>;

    /// Deliver one notification per payload. Returns how many were created.
    async fn bulk_create(&self, payloads: &[CreateNotification]) -> AppResult<u64>;
}

/// Writes notifications to the notification store.
#[derive(Clone)]
pub struct StoreNotificationSink {
    store: Arc<dyn NotificationStore>,
}

impl std::fmt::Debug for StoreNotificationSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreNotificationSink").finish()
    }
}

impl StoreNotificationSink {
    /// Creates a sink over `store`.
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// In-app notifications for a status change: one for the customer and,
    /// when known, one for the volunteer.
    pub fn status_change_payloads(event: &OrderStatusChanged) -> Vec<CreateNotification> {
        let message = format!("Order {} is now {}", event.order_id, event.new_status);

        let mut payloads = vec![CreateNotification::new(
            event.customer_id,
            UserRole::Customer,
            "Order status updated",
            message.clone(),
        )];
        if let Some(volunteer) = event.volunteer_id {
            payloads.push(CreateNotification::new(
                volunteer,
                UserRole::Volunteer,
                "Order status updated",
                message,
            ));
        }
        payloads
    }
}

#[async_trait]
impl NotificationSink for StoreNotificationSink {
    async fn notify_status_change(&self, event: &OrderStatusChanged) -> AppResult<()> {
        let payloads = Self::status_change_payloads(event);
        self.store.insert_many(&payloads).await?;
        debug!(
            order_id = %event.order_id,
            status = %event.new_status,
            recipients = payloads.len(),
            "Status change notifications created"
        );
        Ok(())
    }

    async fn bulk_create(&self, payloads: &[CreateNotification]) -> AppResult<u64> {
        self.store.insert_many(payloads).await
    }
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotificationSink;

#[async_trait]
impl NotificationSink for NoopNotificationSink {
    async fn notify_status_change(&self, _event: &OrderStatusChanged) -> AppResult<()> {
        Ok(())
    }

    async fn bulk_create(&self, payloads: &[CreateNotification]) -> AppResult<u64> {
        Ok(payloads.len() as u64)
    }
}

/// Records calls and can be told to fail.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingNotificationSink {
    pub events: tokio::sync::Mutex<Vec<OrderStatusChanged>>,
    pub batches: tokio::sync::Mutex<Vec<Vec<CreateNotification>>>,
    pub fail: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl RecordingNotificationSink {
    pub fn failing() -> Self {
        let sink = Self::default();
        sink.fail.store(true, std::sync::atomic::Ordering::SeqCst);
        sink
    }

    fn check(&self) -> AppResult<()> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(orderhub_core::AppError::external("dispatcher unavailable"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn notify_status_change(&self, event: &OrderStatusChanged) -> AppResult<()> {
        self.check()?;
        self.events.lock().await.push(event.clone());
        Ok(())
    }

    async fn bulk_create(&self, payloads: &[CreateNotification]) -> AppResult<u64> {
        self.check()?;
        self.batches.lock().await.push(payloads.to_vec());
        Ok(payloads.len() as u64)
    }
}
