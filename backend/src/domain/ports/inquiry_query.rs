//! Driving port for reading inquiries.

use async_trait::async_trait;

use crate::domain::{Error, Inquiry, InquiryId, InquiryListFilter, Principal, StatusCounts};

/// Request for a single inquiry.
#[derive(Debug, Clone)]
pub struct GetInquiryRequest {
    pub principal: Option<Principal>,
    pub inquiry_id: InquiryId,
}

/// Request for one of the inquiry listings.
#[derive(Debug, Clone)]
pub struct ListInquiriesRequest {
    pub principal: Option<Principal>,
    pub filter: InquiryListFilter,
}

/// Per-status counts over the caller's own inquiries (all inquiries for
/// admins).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InquirySummary {
    pub counts: StatusCounts,
}

/// Driving port for inquiry reads.
///
/// Listings are newest first and exclude deleted inquiries unless the filter
/// asks for them; buyers never see deleted inquiries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InquiryQuery: Send + Sync {
    /// Fetch one inquiry visible to the caller.
    async fn get_by_id(&self, request: GetInquiryRequest) -> Result<Inquiry, Error>;

    /// Inquiries the calling buyer has sent.
    async fn list_for_buyer(&self, request: ListInquiriesRequest) -> Result<Vec<Inquiry>, Error>;

    /// Inquiries addressed to the calling supplier.
    async fn list_for_supplier(&self, request: ListInquiriesRequest)
    -> Result<Vec<Inquiry>, Error>;

    /// Every inquiry, for moderators.
    async fn list_all(&self, request: ListInquiriesRequest) -> Result<Vec<Inquiry>, Error>;

    /// Per-status counts scoped to the caller.
    async fn summary(&self, principal: Option<Principal>) -> Result<InquirySummary, Error>;
}

/// Fixture query port with no inquiries.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureInquiryQuery;

#[async_trait]
impl InquiryQuery for FixtureInquiryQuery {
    async fn get_by_id(&self, _request: GetInquiryRequest) -> Result<Inquiry, Error> {
        Err(Error::not_found("inquiry not found"))
    }

    async fn list_for_buyer(&self, _request: ListInquiriesRequest) -> Result<Vec<Inquiry>, Error> {
        Ok(Vec::new())
    }

    async fn list_for_supplier(
        &self,
        _request: ListInquiriesRequest,
    ) -> Result<Vec<Inquiry>, Error> {
        Ok(Vec::new())
    }

    async fn list_all(&self, _request: ListInquiriesRequest) -> Result<Vec<Inquiry>, Error> {
        Ok(Vec::new())
    }

    async fn summary(&self, _principal: Option<Principal>) -> Result<InquirySummary, Error> {
        Ok(InquirySummary {
            counts: StatusCounts::default(),
        })
    }
}
