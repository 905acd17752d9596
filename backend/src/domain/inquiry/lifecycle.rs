//! Pure lifecycle transitions.
//!
//! ```text
//! pending ──supplier_reply──▶ replied ──buyer_reply (once)──▶ replied
//!    │                           │
//!    ├──────────close────────────┴──▶ closed (terminal)
//!    └──────soft_delete──────────┬──▶ deleted ──recover──▶ previous status
//! ```
//!
//! Every transition takes the current inquiry by reference and returns the
//! successor with `revision + 1`, or an error that leaves nothing changed.

use chrono::{DateTime, Utc};

use super::{Inquiry, InquiryStatus, InquiryStatusKind, MessageBody, RecoverableStatus, Reply};

/// Reasons a transition is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot {event} an inquiry that is {from}")]
    InvalidState {
        event: InquiryEvent,
        from: InquiryStatusKind,
    },
    #[error("the buyer has already replied to this inquiry")]
    DuplicateReply,
}

/// Committed lifecycle events, used for logging and post-commit hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InquiryEvent {
    Submitted,
    SupplierReplied,
    BuyerReplied,
    SoftDeleted,
    Recovered,
    Closed,
}

impl InquiryEvent {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submit",
            Self::SupplierReplied => "supplier_reply",
            Self::BuyerReplied => "buyer_reply",
            Self::SoftDeleted => "soft_delete",
            Self::Recovered => "recover",
            Self::Closed => "close",
        }
    }
}

impl std::fmt::Display for InquiryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested state change on an existing inquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    SupplierReply(MessageBody),
    BuyerReply(MessageBody),
    SoftDelete,
    Recover,
    Close,
}

impl Transition {
    pub fn event(&self) -> InquiryEvent {
        match self {
            Self::SupplierReply(_) => InquiryEvent::SupplierReplied,
            Self::BuyerReply(_) => InquiryEvent::BuyerReplied,
            Self::SoftDelete => InquiryEvent::SoftDeleted,
            Self::Recover => InquiryEvent::Recovered,
            Self::Close => InquiryEvent::Closed,
        }
    }

    /// Apply this transition to `inquiry` at time `at`.
    pub fn apply(&self, inquiry: &Inquiry, at: DateTime<Utc>) -> Result<Inquiry, TransitionError> {
        match self {
            Self::SupplierReply(text) => inquiry.supplier_reply_with(text.clone(), at),
            Self::BuyerReply(text) => inquiry.buyer_reply_with(text.clone(), at),
            Self::SoftDelete => inquiry.soft_delete(at),
            Self::Recover => inquiry.recover(at),
            Self::Close => inquiry.close(at),
        }
    }
}

impl Inquiry {
    fn invalid(&self, event: InquiryEvent) -> TransitionError {
        TransitionError::InvalidState {
            event,
            from: self.status.kind(),
        }
    }

    fn advanced(&self, status: InquiryStatus, at: DateTime<Utc>) -> Self {
        Self {
            status,
            updated_at: at,
            revision: self.revision + 1,
            ..self.clone()
        }
    }

    /// Record the supplier's answer. Requires `pending`.
    pub fn supplier_reply_with(
        &self,
        text: MessageBody,
        at: DateTime<Utc>,
    ) -> Result<Self, TransitionError> {
        if self.status != InquiryStatus::Pending {
            return Err(self.invalid(InquiryEvent::SupplierReplied));
        }
        let mut next = self.advanced(InquiryStatus::Replied, at);
        next.supplier_reply = Some(Reply { text, at });
        Ok(next)
    }

    /// Record the buyer's single rebuttal. Requires `replied` with no
    /// earlier buyer reply; the status stays `replied`.
    pub fn buyer_reply_with(
        &self,
        text: MessageBody,
        at: DateTime<Utc>,
    ) -> Result<Self, TransitionError> {
        if self.status != InquiryStatus::Replied || self.supplier_reply.is_none() {
            return Err(self.invalid(InquiryEvent::BuyerReplied));
        }
        if self.buyer_reply.is_some() {
            return Err(TransitionError::DuplicateReply);
        }
        let mut next = self.advanced(InquiryStatus::Replied, at);
        next.buyer_reply = Some(Reply { text, at });
        Ok(next)
    }

    /// Soft-delete from `pending` or `replied`.
    pub fn soft_delete(&self, at: DateTime<Utc>) -> Result<Self, TransitionError> {
        let previous = match self.status {
            InquiryStatus::Pending => RecoverableStatus::Pending,
            InquiryStatus::Replied => RecoverableStatus::Replied,
            InquiryStatus::Closed | InquiryStatus::Deleted { .. } => {
                return Err(self.invalid(InquiryEvent::SoftDeleted));
            }
        };
        Ok(self.advanced(InquiryStatus::Deleted { previous }, at))
    }

    /// Restore a deleted inquiry to the status it had before deletion.
    pub fn recover(&self, at: DateTime<Utc>) -> Result<Self, TransitionError> {
        let InquiryStatus::Deleted { previous } = self.status else {
            return Err(self.invalid(InquiryEvent::Recovered));
        };
        let restored = match previous {
            RecoverableStatus::Pending => InquiryStatus::Pending,
            RecoverableStatus::Replied => InquiryStatus::Replied,
        };
        Ok(self.advanced(restored, at))
    }

    /// Close from `pending` or `replied`; terminal.
    pub fn close(&self, at: DateTime<Utc>) -> Result<Self, TransitionError> {
        match self.status {
            InquiryStatus::Pending | InquiryStatus::Replied => {
                Ok(self.advanced(InquiryStatus::Closed, at))
            }
            InquiryStatus::Closed | InquiryStatus::Deleted { .. } => {
                Err(self.invalid(InquiryEvent::Closed))
            }
        }
    }
}
