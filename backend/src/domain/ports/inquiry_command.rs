//! Driving port for inquiry lifecycle commands.
//!
//! Inbound adapters resolve the caller's [`Principal`] from the session and
//! pass it along with raw client input; validation, authorisation and the
//! state machine all live behind this port.

use async_trait::async_trait;

use crate::domain::{Error, Inquiry, InquiryId, Principal};

/// Request to submit a new inquiry.
#[derive(Debug, Clone)]
pub struct SubmitInquiryRequest {
    /// The acting principal, `None` for anonymous callers.
    pub principal: Option<Principal>,
    /// Supplier the inquiry is addressed to.
    pub supplier_id: String,
    /// Optional catalogue product the inquiry is about.
    pub product_id: Option<String>,
    pub subject: String,
    pub message: String,
    /// Requested quantity; defaults to the product's minimum order quantity.
    pub quantity: Option<i64>,
}

/// Request carrying reply text for an existing inquiry.
#[derive(Debug, Clone)]
pub struct ReplyRequest {
    pub principal: Option<Principal>,
    pub inquiry_id: InquiryId,
    pub text: String,
}

/// Request to act on an existing inquiry without further input.
#[derive(Debug, Clone)]
pub struct InquiryActionRequest {
    pub principal: Option<Principal>,
    pub inquiry_id: InquiryId,
}

/// Driving port for inquiry transitions.
///
/// Every command returns the committed inquiry. Notifications run after the
/// commit and never affect the result.
///
/// # Errors
///
/// - `not_authenticated`, `wrong_role`, `not_owner`, `not_verified`,
///   `not_approved` when the access guard refuses the caller.
/// - `not_found` when the inquiry does not exist.
/// - `invalid_state` or `duplicate_reply` when the inquiry's state forbids
///   the transition.
/// - `write_conflict` when concurrent writers kept winning the race.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InquiryCommand: Send + Sync {
    /// Submit a new inquiry as a buyer.
    async fn submit(&self, request: SubmitInquiryRequest) -> Result<Inquiry, Error>;

    /// Answer a pending inquiry as its supplier.
    async fn supplier_reply(&self, request: ReplyRequest) -> Result<Inquiry, Error>;

    /// Answer the supplier's reply once, as the buyer.
    async fn buyer_reply(&self, request: ReplyRequest) -> Result<Inquiry, Error>;

    /// Soft-delete an inquiry as its supplier or as a moderator.
    async fn soft_delete(&self, request: InquiryActionRequest) -> Result<Inquiry, Error>;

    /// Restore a soft-deleted inquiry as its supplier.
    async fn recover(&self, request: InquiryActionRequest) -> Result<Inquiry, Error>;

    /// Close an inquiry as a moderator.
    async fn close(&self, request: InquiryActionRequest) -> Result<Inquiry, Error>;
}

/// Fixture command port that refuses every call as anonymous.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureInquiryCommand;

#[async_trait]
impl InquiryCommand for FixtureInquiryCommand {
    async fn submit(&self, _request: SubmitInquiryRequest) -> Result<Inquiry, Error> {
        Err(Error::not_authenticated("fixture command port"))
    }

    async fn supplier_reply(&self, _request: ReplyRequest) -> Result<Inquiry, Error> {
        Err(Error::not_authenticated("fixture command port"))
    }

    async fn buyer_reply(&self, _request: ReplyRequest) -> Result<Inquiry, Error> {
        Err(Error::not_authenticated("fixture command port"))
    }

    async fn soft_delete(&self, _request: InquiryActionRequest) -> Result<Inquiry, Error> {
        Err(Error::not_authenticated("fixture command port"))
    }

    async fn recover(&self, _request: InquiryActionRequest) -> Result<Inquiry, Error> {
        Err(Error::not_authenticated("fixture command port"))
    }

    async fn close(&self, _request: InquiryActionRequest) -> Result<Inquiry, Error> {
        Err(Error::not_authenticated("fixture command port"))
    }
}
