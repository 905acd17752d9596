//! Domain primitives, aggregates and services.
//!
//! Purpose: model the inquiry lifecycle of the marketplace, the dual-slot
//! identity resolution and the access rules that decide who may read or
//! mutate an inquiry in each state. Types are immutable; transitions return
//! new values and never touch storage directly.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Principal / IdentityResolver: per-request identity context.
//! - authorize / Operation / Decision: the access guard.
//! - Inquiry and its value types: the aggregate and its pure transitions.
//! - InquiryService: orchestration implementing the driving ports.
//! - PostCommitHooks: side effects run after a committed transition.

pub mod access;
pub mod error;
pub mod inquiry;
pub mod inquiry_service;
pub mod notifications;
pub mod ports;
pub mod principal;
pub mod trace_id;

pub use self::access::{Decision, DenialReason, Operation, OperationKind, authorize};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::inquiry::{
    Inquiry, InquiryDraft, InquiryEvent, InquiryId, InquiryListFilter, InquiryParts,
    InquiryStatus, InquiryStatusKind, InquiryValidationError, MessageBody, ProductId, Quantity,
    RecoverableStatus, Reply, StatusCounts, Subject, Transition, TransitionError,
};
pub use self::inquiry_service::{DEFAULT_MAX_CONFLICT_RETRIES, InquiryService};
pub use self::notifications::{
    CommittedTransition, HookError, HookMode, NotifyHook, PostCommitHook, PostCommitHooks,
    notification_for,
};
pub use self::principal::{
    IdentityResolver, Principal, PrincipalId, PrincipalIdValidationError, Role, StoredIdentity,
};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use inquiry_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_authenticated("sign in first"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
