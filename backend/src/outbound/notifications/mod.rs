//! Notification dispatcher adapters.
//!
//! `TracingNotificationDispatcher` writes each notification as a structured
//! log line and is the default. `WebhookNotificationDispatcher` POSTs it as
//! JSON to a configured endpoint.

mod logging;
mod webhook;

pub use logging::TracingNotificationDispatcher;
pub use webhook::WebhookNotificationDispatcher;
