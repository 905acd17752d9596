//! Log-only notification delivery.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{Notification, NotificationDispatcher, NotificationDispatcherError};

/// Dispatcher that records notifications in the log instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationDispatcher;

#[async_trait]
impl NotificationDispatcher for TracingNotificationDispatcher {
    async fn notify(&self, notification: &Notification) -> Result<(), NotificationDispatcherError> {
        info!(
            recipient = %notification.recipient,
            kind = %notification.kind,
            inquiry_id = %notification.payload.inquiry_id,
            subject = notification.payload.subject.as_str(),
            "notification dispatched"
        );
        Ok(())
    }
}
