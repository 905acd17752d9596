//! Notification dispatchers that record or reject deliveries.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{Notification, NotificationDispatcher, NotificationDispatcherError};

/// Dispatcher that keeps every notification it receives.
#[derive(Default)]
pub struct RecordingDispatcher(Mutex<Vec<Notification>>);

impl RecordingDispatcher {
    /// Snapshot of the notifications delivered so far.
    pub fn delivered(&self) -> Vec<Notification> {
        match self.0.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => panic!("dispatcher mutex"),
        }
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn notify(&self, notification: &Notification) -> Result<(), NotificationDispatcherError> {
        match self.0.lock() {
            Ok(mut guard) => guard.push(notification.clone()),
            Err(_) => panic!("dispatcher mutex"),
        }
        Ok(())
    }
}

/// Dispatcher that fails every delivery.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingDispatcher;

#[async_trait]
impl NotificationDispatcher for FailingDispatcher {
    async fn notify(&self, _notification: &Notification) -> Result<(), NotificationDispatcherError> {
        Err(NotificationDispatcherError::delivery("mail relay offline"))
    }
}
