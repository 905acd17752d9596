//! Webhook notification delivery over HTTP.
//!
//! Each notification is POSTed as its camelCase JSON form. Any non-2xx reply
//! is reported as [`NotificationDispatcherError::Rejected`]; the caller only
//! logs it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::domain::ports::{Notification, NotificationDispatcher, NotificationDispatcherError};

/// Dispatcher that POSTs notifications to a single endpoint.
pub struct WebhookNotificationDispatcher {
    client: Client,
    endpoint: Url,
}

impl WebhookNotificationDispatcher {
    /// Build a dispatcher whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl NotificationDispatcher for WebhookNotificationDispatcher {
    async fn notify(&self, notification: &Notification) -> Result<(), NotificationDispatcherError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(notification)
            .send()
            .await
            .map_err(|error| NotificationDispatcherError::delivery(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotificationDispatcherError::rejected(status.as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{NotificationKind, NotificationPayload};
    use crate::domain::InquiryId;
    use crate::test_support::principal_id;
    use rstest::rstest;
    use serde_json::json;
    use uuid::Uuid;

    #[rstest]
    fn notifications_serialise_as_camel_case_json() {
        let id = InquiryId::from_uuid(Uuid::nil());
        let notification = Notification {
            recipient: principal_id("11"),
            kind: NotificationKind::NewInquiry,
            payload: NotificationPayload {
                inquiry_id: id,
                subject: "Bulk pricing".to_owned(),
                excerpt: "Is this available in bulk?".to_owned(),
            },
        };

        let value = serde_json::to_value(&notification).expect("serialises");
        assert_eq!(
            value,
            json!({
                "recipient": "11",
                "kind": "new_inquiry",
                "payload": {
                    "inquiryId": "00000000-0000-0000-0000-000000000000",
                    "subject": "Bulk pricing",
                    "excerpt": "Is this available in bulk?",
                }
            })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn unreachable_endpoint_is_a_delivery_error() {
        let endpoint = Url::parse("http://127.0.0.1:9/hooks").expect("valid url");
        let dispatcher = WebhookNotificationDispatcher::new(endpoint, Duration::from_millis(200))
            .expect("client builds");
        let notification = Notification {
            recipient: principal_id("7"),
            kind: NotificationKind::ReplyReceived,
            payload: NotificationPayload {
                inquiry_id: InquiryId::random(),
                subject: "Bulk pricing".to_owned(),
                excerpt: "Yes".to_owned(),
            },
        };

        let err = dispatcher.notify(&notification).await.expect_err("no listener");
        assert!(matches!(err, NotificationDispatcherError::Delivery { .. }));
    }
}
