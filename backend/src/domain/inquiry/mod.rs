//! Inquiry aggregate and its value types.
//!
//! An inquiry is a buyer's message to a supplier, optionally about a
//! product. The status is a tagged union: the deleted variant remembers the
//! status it will return to on recovery, and each reply is stored together
//! with its timestamp so the two can never diverge.
//!
//! State changes happen only through the pure transitions in [`lifecycle`];
//! each returns a new inquiry with the revision incremented by one.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::PrincipalId;

mod lifecycle;

pub use lifecycle::{InquiryEvent, Transition, TransitionError};

/// Maximum subject length in characters, after trimming.
pub const SUBJECT_MAX_CHARS: usize = 200;
/// Maximum message or reply length in characters, after trimming.
pub const BODY_MAX_CHARS: usize = 5000;

/// Validation failures raised while building inquiry values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InquiryValidationError {
    #[error("{field} must not be empty")]
    EmptyText { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TextTooLong { field: &'static str, max: usize },
    #[error("quantity must be a positive integer")]
    NonPositiveQuantity,
    #[error("quantity exceeds the supported range")]
    QuantityOutOfRange,
    #[error("product id must be non-empty without surrounding whitespace")]
    InvalidProductId,
    #[error("a buyer reply requires a supplier reply")]
    BuyerReplyWithoutSupplierReply,
    #[error("a replied inquiry must carry a supplier reply")]
    RepliedWithoutReply,
    #[error("buyer and supplier must be different accounts")]
    SelfAddressed,
}

impl InquiryValidationError {
    /// Name of the offending input field, for error details.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyText { field } | Self::TextTooLong { field, .. } => field,
            Self::NonPositiveQuantity | Self::QuantityOutOfRange => "quantity",
            Self::InvalidProductId => "productId",
            Self::BuyerReplyWithoutSupplierReply => "buyerReply",
            Self::RepliedWithoutReply => "supplierReply",
            Self::SelfAddressed => "supplierId",
        }
    }
}

fn bounded_text(
    raw: &str,
    field: &'static str,
    max: usize,
) -> Result<String, InquiryValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InquiryValidationError::EmptyText { field });
    }
    if trimmed.chars().count() > max {
        return Err(InquiryValidationError::TextTooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Unique inquiry identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InquiryId(Uuid);

impl InquiryId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for InquiryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for InquiryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Identifier of a catalogue product, owned by the external catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Result<Self, InquiryValidationError> {
        let id = id.into();
        if id.is_empty() || id.trim() != id {
            return Err(InquiryValidationError::InvalidProductId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ProductId> for String {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ProductId {
    type Error = InquiryValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Strictly positive order quantity, at most [`Quantity::MAX`].
///
/// # Examples
/// ```
/// use inquiry_backend::domain::Quantity;
///
/// assert_eq!(Quantity::new(50).expect("positive").get(), 50);
/// assert!(Quantity::new(0).is_err());
/// assert!(Quantity::new(-3).is_err());
/// assert!(Quantity::new(i64::from(Quantity::MAX) + 1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(i32);

impl Quantity {
    /// Largest accepted quantity; the storage column is a 32-bit `INTEGER`.
    pub const MAX: u32 = i32::MAX.unsigned_abs();

    /// Validate a raw quantity as received from a client.
    pub fn new(value: i64) -> Result<Self, InquiryValidationError> {
        if value <= 0 {
            return Err(InquiryValidationError::NonPositiveQuantity);
        }
        i32::try_from(value)
            .map(Self)
            .map_err(|_| InquiryValidationError::QuantityOutOfRange)
    }

    pub fn get(self) -> u32 {
        self.0.unsigned_abs()
    }

    /// The quantity as a signed 32-bit value, always positive.
    pub fn as_i32(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for Quantity {
    type Error = InquiryValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.get()
    }
}

/// Inquiry subject line, trimmed, 1 to [`SUBJECT_MAX_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subject(String);

impl Subject {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InquiryValidationError> {
        bounded_text(raw.as_ref(), "subject", SUBJECT_MAX_CHARS).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Subject> for String {
    fn from(value: Subject) -> Self {
        value.0
    }
}

impl TryFrom<String> for Subject {
    type Error = InquiryValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Free-text message or reply, trimmed, 1 to [`BODY_MAX_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageBody(String);

impl MessageBody {
    /// Validate `raw`, naming `field` in any error.
    pub fn new(raw: impl AsRef<str>, field: &'static str) -> Result<Self, InquiryValidationError> {
        bounded_text(raw.as_ref(), field, BODY_MAX_CHARS).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Leading characters of the text, for notification payloads.
    pub fn excerpt(&self, max_chars: usize) -> String {
        self.0.chars().take(max_chars).collect()
    }
}

impl From<MessageBody> for String {
    fn from(value: MessageBody) -> Self {
        value.0
    }
}

impl TryFrom<String> for MessageBody {
    type Error = InquiryValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value, "text")
    }
}

/// A reply text together with the moment it was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: MessageBody,
    pub at: DateTime<Utc>,
}

/// Statuses a deleted inquiry can be restored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecoverableStatus {
    Pending,
    Replied,
}

impl RecoverableStatus {
    pub fn kind(self) -> InquiryStatusKind {
        match self {
            Self::Pending => InquiryStatusKind::Pending,
            Self::Replied => InquiryStatusKind::Replied,
        }
    }
}

/// Lifecycle state of an inquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InquiryStatus {
    Pending,
    Replied,
    Closed,
    /// Soft-deleted; recovery restores `previous`.
    Deleted { previous: RecoverableStatus },
}

impl InquiryStatus {
    /// Flat status as exposed on the wire and in filters.
    pub fn kind(self) -> InquiryStatusKind {
        match self {
            Self::Pending => InquiryStatusKind::Pending,
            Self::Replied => InquiryStatusKind::Replied,
            Self::Closed => InquiryStatusKind::Closed,
            Self::Deleted { .. } => InquiryStatusKind::Deleted,
        }
    }

    pub fn is_deleted(self) -> bool {
        matches!(self, Self::Deleted { .. })
    }

    /// Status a recovery would restore, when deleted.
    pub fn before_delete(self) -> Option<InquiryStatusKind> {
        match self {
            Self::Deleted { previous } => Some(previous.kind()),
            _ => None,
        }
    }
}

/// Wire representation of [`InquiryStatus`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatusKind {
    Pending,
    Replied,
    Closed,
    Deleted,
}

impl InquiryStatusKind {
    pub const ALL: [Self; 4] = [Self::Pending, Self::Replied, Self::Closed, Self::Deleted];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Replied => "replied",
            Self::Closed => "closed",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for InquiryStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InquiryStatusKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown inquiry status: {s}"))
    }
}

/// Listing filter.
///
/// With no status the listing excludes deleted inquiries; `Some(Deleted)`
/// shows only the recoverable ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InquiryListFilter {
    pub status: Option<InquiryStatusKind>,
}

impl InquiryListFilter {
    pub fn with_status(status: InquiryStatusKind) -> Self {
        Self {
            status: Some(status),
        }
    }

    /// Whether an inquiry in `status` belongs in the listing.
    pub fn matches(&self, status: InquiryStatus) -> bool {
        match self.status {
            Some(wanted) => status.kind() == wanted,
            None => !status.is_deleted(),
        }
    }
}

/// Per-status inquiry counts, used by unread-badge pollers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: u64,
    pub replied: u64,
    pub closed: u64,
    pub deleted: u64,
}

impl StatusCounts {
    /// Count one inquiry in `status`.
    pub fn record(&mut self, status: InquiryStatusKind) {
        match status {
            InquiryStatusKind::Pending => self.pending += 1,
            InquiryStatusKind::Replied => self.replied += 1,
            InquiryStatusKind::Closed => self.closed += 1,
            InquiryStatusKind::Deleted => self.deleted += 1,
        }
    }

    /// Total of the non-deleted inquiries.
    pub fn open_total(&self) -> u64 {
        self.pending + self.replied + self.closed
    }
}

/// Validated input for a new inquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InquiryDraft {
    pub buyer_id: PrincipalId,
    pub supplier_id: PrincipalId,
    pub product_id: Option<ProductId>,
    pub subject: Subject,
    pub message: MessageBody,
    pub quantity: Quantity,
}

/// Raw stored fields of an inquiry, used by persistence adapters to
/// rebuild the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InquiryParts {
    pub id: InquiryId,
    pub buyer_id: PrincipalId,
    pub supplier_id: PrincipalId,
    pub product_id: Option<ProductId>,
    pub subject: Subject,
    pub message: MessageBody,
    pub quantity: Quantity,
    pub status: InquiryStatus,
    pub supplier_reply: Option<Reply>,
    pub buyer_reply: Option<Reply>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: u32,
}

/// Inquiry aggregate.
///
/// ## Invariants
/// - A buyer reply exists only alongside a supplier reply.
/// - A replied inquiry (or one deleted from replied) carries a supplier
///   reply.
/// - `buyer_id` and `supplier_id` never change after creation.
/// - `revision` starts at 1 and grows by one per committed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inquiry {
    id: InquiryId,
    buyer_id: PrincipalId,
    supplier_id: PrincipalId,
    product_id: Option<ProductId>,
    subject: Subject,
    message: MessageBody,
    quantity: Quantity,
    status: InquiryStatus,
    supplier_reply: Option<Reply>,
    buyer_reply: Option<Reply>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    revision: u32,
}

impl Inquiry {
    /// Create a pending inquiry at revision 1.
    pub fn submit(
        draft: InquiryDraft,
        id: InquiryId,
        now: DateTime<Utc>,
    ) -> Result<Self, InquiryValidationError> {
        if draft.buyer_id == draft.supplier_id {
            return Err(InquiryValidationError::SelfAddressed);
        }
        let InquiryDraft {
            buyer_id,
            supplier_id,
            product_id,
            subject,
            message,
            quantity,
        } = draft;
        Ok(Self {
            id,
            buyer_id,
            supplier_id,
            product_id,
            subject,
            message,
            quantity,
            status: InquiryStatus::Pending,
            supplier_reply: None,
            buyer_reply: None,
            created_at: now,
            updated_at: now,
            revision: 1,
        })
    }

    /// Rebuild a stored inquiry, checking the reply invariants.
    pub fn from_parts(parts: InquiryParts) -> Result<Self, InquiryValidationError> {
        if parts.buyer_reply.is_some() && parts.supplier_reply.is_none() {
            return Err(InquiryValidationError::BuyerReplyWithoutSupplierReply);
        }
        let needs_reply = matches!(
            parts.status,
            InquiryStatus::Replied
                | InquiryStatus::Deleted {
                    previous: RecoverableStatus::Replied
                }
        );
        if needs_reply && parts.supplier_reply.is_none() {
            return Err(InquiryValidationError::RepliedWithoutReply);
        }
        let InquiryParts {
            id,
            buyer_id,
            supplier_id,
            product_id,
            subject,
            message,
            quantity,
            status,
            supplier_reply,
            buyer_reply,
            created_at,
            updated_at,
            revision,
        } = parts;
        Ok(Self {
            id,
            buyer_id,
            supplier_id,
            product_id,
            subject,
            message,
            quantity,
            status,
            supplier_reply,
            buyer_reply,
            created_at,
            updated_at,
            revision,
        })
    }

    pub fn id(&self) -> InquiryId {
        self.id
    }

    pub fn buyer_id(&self) -> &PrincipalId {
        &self.buyer_id
    }

    pub fn supplier_id(&self) -> &PrincipalId {
        &self.supplier_id
    }

    pub fn product_id(&self) -> Option<&ProductId> {
        self.product_id.as_ref()
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn message(&self) -> &MessageBody {
        &self.message
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn status(&self) -> InquiryStatus {
        self.status
    }

    pub fn supplier_reply(&self) -> Option<&Reply> {
        self.supplier_reply.as_ref()
    }

    pub fn buyer_reply(&self) -> Option<&Reply> {
        self.buyer_reply.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Whether `id` is the buyer or supplier of this inquiry.
    pub fn is_party(&self, id: &PrincipalId) -> bool {
        &self.buyer_id == id || &self.supplier_id == id
    }
}
