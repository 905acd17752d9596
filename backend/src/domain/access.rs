//! Access guard: decides whether a principal may perform an operation.
//!
//! Rules are evaluated in a fixed order and short-circuit on the first
//! failure, so a denial always names the earliest rule that failed: role,
//! then verification, then approval, then ownership, then state. A missing
//! principal is `not_authenticated` for every operation.
//!
//! The super-administrator bypasses role, ownership, verification and
//! approval checks. State preconditions still apply to everyone because they
//! protect the data, not access to it.

use std::fmt;

use serde_json::json;

use super::{Error, ErrorCode, Inquiry, InquiryStatus, Principal, Role};

/// Operation being authorised. Inquiry-scoped operations carry the
/// inquiry they act on, so a guard call can never forget it.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    CreateInquiry,
    ReplyAsSupplier(&'a Inquiry),
    ReplyAsBuyer(&'a Inquiry),
    DeleteInquiry(&'a Inquiry),
    RecoverInquiry(&'a Inquiry),
    ListAsBuyer,
    ListAsSupplier,
    ListAll,
    ViewInquiry(&'a Inquiry),
    ModerateDelete(&'a Inquiry),
    CloseInquiry(&'a Inquiry),
    ViewSummary,
}

/// Inquiry-free name of an [`Operation`], for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateInquiry,
    ReplyAsSupplier,
    ReplyAsBuyer,
    DeleteInquiry,
    RecoverInquiry,
    ListAsBuyer,
    ListAsSupplier,
    ListAll,
    ViewInquiry,
    ModerateDelete,
    CloseInquiry,
    ViewSummary,
}

impl OperationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateInquiry => "create_inquiry",
            Self::ReplyAsSupplier => "reply_as_supplier",
            Self::ReplyAsBuyer => "reply_as_buyer",
            Self::DeleteInquiry => "delete_inquiry",
            Self::RecoverInquiry => "recover_inquiry",
            Self::ListAsBuyer => "list_as_buyer",
            Self::ListAsSupplier => "list_as_supplier",
            Self::ListAll => "list_all",
            Self::ViewInquiry => "view_inquiry",
            Self::ModerateDelete => "moderate_delete",
            Self::CloseInquiry => "close_inquiry",
            Self::ViewSummary => "view_summary",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Operation<'_> {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::CreateInquiry => OperationKind::CreateInquiry,
            Self::ReplyAsSupplier(_) => OperationKind::ReplyAsSupplier,
            Self::ReplyAsBuyer(_) => OperationKind::ReplyAsBuyer,
            Self::DeleteInquiry(_) => OperationKind::DeleteInquiry,
            Self::RecoverInquiry(_) => OperationKind::RecoverInquiry,
            Self::ListAsBuyer => OperationKind::ListAsBuyer,
            Self::ListAsSupplier => OperationKind::ListAsSupplier,
            Self::ListAll => OperationKind::ListAll,
            Self::ViewInquiry(_) => OperationKind::ViewInquiry,
            Self::ModerateDelete(_) => OperationKind::ModerateDelete,
            Self::CloseInquiry(_) => OperationKind::CloseInquiry,
            Self::ViewSummary => OperationKind::ViewSummary,
        }
    }
}

/// Why an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenialReason {
    NotAuthenticated,
    WrongRole,
    NotOwner,
    NotVerified,
    NotApproved,
    InvalidState,
    DuplicateReply,
}

impl DenialReason {
    pub fn code(self) -> ErrorCode {
        match self {
            Self::NotAuthenticated => ErrorCode::NotAuthenticated,
            Self::WrongRole => ErrorCode::WrongRole,
            Self::NotOwner => ErrorCode::NotOwner,
            Self::NotVerified => ErrorCode::NotVerified,
            Self::NotApproved => ErrorCode::NotApproved,
            Self::InvalidState => ErrorCode::InvalidState,
            Self::DuplicateReply => ErrorCode::DuplicateReply,
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::NotAuthenticated => "sign in to continue",
            Self::WrongRole => "your role does not permit this operation",
            Self::NotOwner => "this inquiry belongs to another account",
            Self::NotVerified => "verify your email address first",
            Self::NotApproved => "your account is awaiting approval",
            Self::InvalidState => "the inquiry is not in a state that permits this operation",
            Self::DuplicateReply => "you have already replied to this inquiry",
        }
    }
}

/// Outcome of [`authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(DenialReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Convert into a domain result, describing `operation` on denial.
    pub fn into_result(self, operation: OperationKind) -> Result<(), Error> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied(reason) => Err(Error::new(reason.code(), reason.message())
                .with_details(json!({ "operation": operation.as_str() }))),
        }
    }
}

macro_rules! require {
    ($cond:expr, $reason:expr) => {
        if !$cond {
            return Decision::Denied($reason);
        }
    };
}

/// Decide whether `principal` may perform `operation`.
///
/// # Examples
/// ```
/// use inquiry_backend::domain::{
///     DenialReason, Decision, IdentityResolver, Operation, PrincipalId, Role, StoredIdentity,
///     authorize,
/// };
///
/// let record = StoredIdentity::new(PrincipalId::new("7").unwrap(), Role::Buyer)
///     .verified_and_approved();
/// let buyer = IdentityResolver::default().resolve(Some(&record), None);
///
/// assert_eq!(authorize(buyer.as_ref(), Operation::CreateInquiry), Decision::Allowed);
/// assert_eq!(
///     authorize(None, Operation::CreateInquiry),
///     Decision::Denied(DenialReason::NotAuthenticated),
/// );
/// ```
pub fn authorize(principal: Option<&Principal>, operation: Operation<'_>) -> Decision {
    let Some(principal) = principal else {
        return Decision::Denied(DenialReason::NotAuthenticated);
    };
    let access = if principal.is_super_admin() {
        Decision::Allowed
    } else {
        check_access(principal, operation)
    };
    if let Decision::Denied(_) = access {
        return access;
    }
    check_state(operation)
}

fn has_role(principal: &Principal, role: Role) -> bool {
    principal.role() == role
}

fn check_capabilities(principal: &Principal) -> Decision {
    require!(principal.email_verified(), DenialReason::NotVerified);
    require!(principal.approved(), DenialReason::NotApproved);
    Decision::Allowed
}

fn check_access(principal: &Principal, operation: Operation<'_>) -> Decision {
    let me = principal.id();
    match operation {
        Operation::CreateInquiry => {
            require!(has_role(principal, Role::Buyer), DenialReason::WrongRole);
            check_capabilities(principal)
        }
        Operation::ReplyAsSupplier(inquiry) => {
            require!(has_role(principal, Role::Supplier), DenialReason::WrongRole);
            let capabilities = check_capabilities(principal);
            if !capabilities.is_allowed() {
                return capabilities;
            }
            require!(inquiry.supplier_id() == me, DenialReason::NotOwner);
            Decision::Allowed
        }
        Operation::ReplyAsBuyer(inquiry) => {
            require!(has_role(principal, Role::Buyer), DenialReason::WrongRole);
            require!(inquiry.buyer_id() == me, DenialReason::NotOwner);
            Decision::Allowed
        }
        Operation::DeleteInquiry(inquiry) | Operation::RecoverInquiry(inquiry) => {
            require!(has_role(principal, Role::Supplier), DenialReason::WrongRole);
            require!(inquiry.supplier_id() == me, DenialReason::NotOwner);
            Decision::Allowed
        }
        Operation::ListAsBuyer => {
            require!(has_role(principal, Role::Buyer), DenialReason::WrongRole);
            Decision::Allowed
        }
        Operation::ListAsSupplier => {
            require!(has_role(principal, Role::Supplier), DenialReason::WrongRole);
            Decision::Allowed
        }
        Operation::ListAll | Operation::ModerateDelete(_) | Operation::CloseInquiry(_) => {
            require!(principal.is_admin(), DenialReason::WrongRole);
            Decision::Allowed
        }
        Operation::ViewInquiry(inquiry) => {
            if principal.is_admin() {
                return Decision::Allowed;
            }
            require!(inquiry.is_party(me), DenialReason::NotOwner);
            Decision::Allowed
        }
        Operation::ViewSummary => Decision::Allowed,
    }
}

fn check_state(operation: Operation<'_>) -> Decision {
    match operation {
        Operation::ReplyAsSupplier(inquiry) => {
            require!(
                inquiry.status() == InquiryStatus::Pending,
                DenialReason::InvalidState
            );
        }
        Operation::ReplyAsBuyer(inquiry) => {
            require!(
                inquiry.status() == InquiryStatus::Replied && inquiry.supplier_reply().is_some(),
                DenialReason::InvalidState
            );
            require!(inquiry.buyer_reply().is_none(), DenialReason::DuplicateReply);
        }
        Operation::DeleteInquiry(inquiry) | Operation::ModerateDelete(inquiry) => {
            require!(
                !inquiry.status().is_deleted(),
                DenialReason::InvalidState
            );
        }
        Operation::RecoverInquiry(inquiry) => {
            require!(inquiry.status().is_deleted(), DenialReason::InvalidState);
        }
        Operation::CloseInquiry(inquiry) => {
            require!(
                matches!(
                    inquiry.status(),
                    InquiryStatus::Pending | InquiryStatus::Replied
                ),
                DenialReason::InvalidState
            );
        }
        Operation::CreateInquiry
        | Operation::ListAsBuyer
        | Operation::ListAsSupplier
        | Operation::ListAll
        | Operation::ViewInquiry(_)
        | Operation::ViewSummary => {}
    }
    Decision::Allowed
}
