//! Post-commit side effects.
//!
//! Transitions never send anything themselves. After the store accepts a
//! write, the service hands the committed event to [`PostCommitHooks`],
//! which runs each registered [`PostCommitHook`]. Hook failures are logged
//! at `warn` and otherwise ignored: the transition is already final.
//!
//! In [`HookMode::Detached`] the hooks run on a spawned task that inherits
//! the request's trace id, so a client that disconnects after the commit
//! does not suppress its notifications. [`HookMode::Inline`] awaits them
//! before returning, which keeps tests deterministic.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::ports::{
    Notification, NotificationDispatcher, NotificationDispatcherError, NotificationKind,
    NotificationPayload,
};
use super::{Inquiry, InquiryEvent, TraceId};

/// Longest text excerpt carried in a notification payload, in characters.
pub const EXCERPT_MAX_CHARS: usize = 280;

/// An event together with the inquiry state it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedTransition {
    pub event: InquiryEvent,
    pub inquiry: Inquiry,
}

/// Failure reported by a post-commit hook.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{hook} hook failed: {message}")]
pub struct HookError {
    pub hook: &'static str,
    pub message: String,
}

/// A side effect run after a transition has been committed.
#[async_trait]
pub trait PostCommitHook: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn on_commit(&self, committed: &CommittedTransition) -> Result<(), HookError>;
}

/// How [`PostCommitHooks::run`] schedules the hooks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HookMode {
    /// Spawn on the runtime and return immediately.
    #[default]
    Detached,
    /// Await every hook before returning.
    Inline,
}

/// Ordered list of hooks run after each commit.
#[derive(Clone, Default)]
pub struct PostCommitHooks {
    hooks: Vec<Arc<dyn PostCommitHook>>,
    mode: HookMode,
}

impl PostCommitHooks {
    pub fn new(mode: HookMode) -> Self {
        Self {
            hooks: Vec::new(),
            mode,
        }
    }

    /// Append `hook` to the list.
    pub fn with_hook(mut self, hook: Arc<dyn PostCommitHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn mode(&self) -> HookMode {
        self.mode
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook for `committed` according to the configured mode.
    pub async fn run(&self, committed: CommittedTransition) {
        if self.hooks.is_empty() {
            return;
        }
        match self.mode {
            HookMode::Inline => run_all(&self.hooks, &committed).await,
            HookMode::Detached => {
                let hooks = self.hooks.clone();
                tokio::spawn(TraceId::propagate(async move {
                    run_all(&hooks, &committed).await;
                }));
            }
        }
    }
}

async fn run_all(hooks: &[Arc<dyn PostCommitHook>], committed: &CommittedTransition) {
    for hook in hooks {
        if let Err(error) = hook.on_commit(committed).await {
            warn!(
                hook = hook.name(),
                inquiry_id = %committed.inquiry.id(),
                event = %committed.event,
                %error,
                "post-commit hook failed"
            );
        }
    }
}

/// The notification a committed event produces, if any.
///
/// Submissions notify the supplier, supplier replies notify the buyer and
/// buyer replies notify the supplier. Deletion, recovery and closing are
/// silent.
pub fn notification_for(committed: &CommittedTransition) -> Option<Notification> {
    let inquiry = &committed.inquiry;
    let (recipient, kind, text) = match committed.event {
        InquiryEvent::Submitted => (
            inquiry.supplier_id(),
            NotificationKind::NewInquiry,
            inquiry.message(),
        ),
        InquiryEvent::SupplierReplied => (
            inquiry.buyer_id(),
            NotificationKind::ReplyReceived,
            &inquiry.supplier_reply()?.text,
        ),
        InquiryEvent::BuyerReplied => (
            inquiry.supplier_id(),
            NotificationKind::BuyerReplied,
            &inquiry.buyer_reply()?.text,
        ),
        InquiryEvent::SoftDeleted | InquiryEvent::Recovered | InquiryEvent::Closed => {
            return None;
        }
    };
    Some(Notification {
        recipient: recipient.clone(),
        kind,
        payload: NotificationPayload {
            inquiry_id: inquiry.id(),
            subject: inquiry.subject().as_str().to_owned(),
            excerpt: text.excerpt(EXCERPT_MAX_CHARS),
        },
    })
}

/// Hook that turns committed events into notifications.
pub struct NotifyHook {
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl NotifyHook {
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl PostCommitHook for NotifyHook {
    fn name(&self) -> &'static str {
        "notify"
    }

    async fn on_commit(&self, committed: &CommittedTransition) -> Result<(), HookError> {
        let Some(notification) = notification_for(committed) else {
            return Ok(());
        };
        debug!(
            recipient = %notification.recipient,
            kind = %notification.kind,
            inquiry_id = %notification.payload.inquiry_id,
            "dispatching notification"
        );
        self.dispatcher
            .notify(&notification)
            .await
            .map_err(|err: NotificationDispatcherError| HookError {
                hook: self.name(),
                message: err.to_string(),
            })
    }
}
