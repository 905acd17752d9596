//! Port for outbound notifications.
//!
//! Notifications are fire-and-forget: they are only sent after a transition
//! has been committed, and a failed delivery is logged but never undoes or
//! fails the transition.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{InquiryId, PrincipalId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification dispatcher adapters.
    pub enum NotificationDispatcherError {
        /// The notification could not be handed to the transport.
        Delivery { message: String } =>
            "notification delivery failed: {message}",
        /// The receiving endpoint refused the notification.
        Rejected { status: u16 } =>
            "notification rejected with status {status}",
    }
}

/// What happened, from the recipient's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A buyer sent the supplier a new inquiry.
    NewInquiry,
    /// The supplier answered the buyer's inquiry.
    ReplyReceived,
    /// The buyer answered the supplier's reply.
    BuyerReplied,
}

impl NotificationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewInquiry => "new_inquiry",
            Self::ReplyReceived => "reply_received",
            Self::BuyerReplied => "buyer_replied",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload carried by every inquiry notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub inquiry_id: InquiryId,
    pub subject: String,
    pub excerpt: String,
}

/// A message for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub recipient: PrincipalId,
    pub kind: NotificationKind,
    pub payload: NotificationPayload,
}

/// Port for delivering notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Deliver `notification` to its recipient.
    async fn notify(&self, notification: &Notification) -> Result<(), NotificationDispatcherError>;
}

/// Dispatcher that drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationDispatcher;

#[async_trait]
impl NotificationDispatcher for FixtureNotificationDispatcher {
    async fn notify(&self, _notification: &Notification) -> Result<(), NotificationDispatcherError> {
        Ok(())
    }
}
