//! Port for inquiry persistence.
//!
//! The [`InquiryRepository`] trait is the only shared mutable resource of the
//! inquiry core. `save` is the sole mutation entry point for existing
//! inquiries and is guarded by an optimistic revision check, which is what
//! serialises concurrent transitions on the same inquiry.

use async_trait::async_trait;

use crate::domain::{Inquiry, InquiryId, InquiryListFilter, PrincipalId, StatusCounts};

use super::define_port_error;

define_port_error! {
    /// Errors raised by inquiry repository adapters.
    pub enum InquiryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "inquiry repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "inquiry repository query failed: {message}",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
        /// An inquiry with this id already exists.
        Duplicate { id: String } =>
            "inquiry already exists: {id}",
        /// The inquiry to update does not exist.
        Missing { id: String } =>
            "inquiry not found: {id}",
    }
}

/// Whose inquiries a per-status count covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InquiryScope {
    Buyer(PrincipalId),
    Supplier(PrincipalId),
    All,
}

impl InquiryScope {
    /// Whether `inquiry` falls inside this scope.
    pub fn contains(&self, inquiry: &Inquiry) -> bool {
        match self {
            Self::Buyer(id) => inquiry.buyer_id() == id,
            Self::Supplier(id) => inquiry.supplier_id() == id,
            Self::All => true,
        }
    }
}

/// Port for inquiry storage and retrieval.
///
/// # Revision Semantics
///
/// - Created inquiries start at revision 1.
/// - Transitions produce the successor with `revision + 1`; the caller passes
///   the revision it loaded as `expected_revision`.
/// - `save` fails with [`InquiryRepositoryError::RevisionMismatch`] when the
///   stored revision differs, and writes nothing.
///
/// # Ordering
///
/// Listings are ordered by creation time, newest first, with ties broken by
/// id so pages are deterministic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InquiryRepository: Send + Sync {
    /// Insert a new inquiry.
    async fn create(&self, inquiry: &Inquiry) -> Result<(), InquiryRepositoryError>;

    /// Fetch an inquiry by id, or `None` if it does not exist.
    async fn find_by_id(&self, id: &InquiryId) -> Result<Option<Inquiry>, InquiryRepositoryError>;

    /// Inquiries sent by `buyer_id` that match `filter`.
    async fn list_for_buyer(
        &self,
        buyer_id: &PrincipalId,
        filter: &InquiryListFilter,
    ) -> Result<Vec<Inquiry>, InquiryRepositoryError>;

    /// Inquiries addressed to `supplier_id` that match `filter`.
    async fn list_for_supplier(
        &self,
        supplier_id: &PrincipalId,
        filter: &InquiryListFilter,
    ) -> Result<Vec<Inquiry>, InquiryRepositoryError>;

    /// Every inquiry that matches `filter`.
    async fn list_all(
        &self,
        filter: &InquiryListFilter,
    ) -> Result<Vec<Inquiry>, InquiryRepositoryError>;

    /// Per-status counts over `scope`, deleted included.
    async fn count_by_status(
        &self,
        scope: &InquiryScope,
    ) -> Result<StatusCounts, InquiryRepositoryError>;

    /// Replace a stored inquiry if its revision still equals
    /// `expected_revision`.
    async fn save(
        &self,
        inquiry: &Inquiry,
        expected_revision: u32,
    ) -> Result<(), InquiryRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
///
/// Lookups return nothing and writes are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureInquiryRepository;

#[async_trait]
impl InquiryRepository for FixtureInquiryRepository {
    async fn create(&self, _inquiry: &Inquiry) -> Result<(), InquiryRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &InquiryId) -> Result<Option<Inquiry>, InquiryRepositoryError> {
        Ok(None)
    }

    async fn list_for_buyer(
        &self,
        _buyer_id: &PrincipalId,
        _filter: &InquiryListFilter,
    ) -> Result<Vec<Inquiry>, InquiryRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_for_supplier(
        &self,
        _supplier_id: &PrincipalId,
        _filter: &InquiryListFilter,
    ) -> Result<Vec<Inquiry>, InquiryRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_all(
        &self,
        _filter: &InquiryListFilter,
    ) -> Result<Vec<Inquiry>, InquiryRepositoryError> {
        Ok(Vec::new())
    }

    async fn count_by_status(
        &self,
        _scope: &InquiryScope,
    ) -> Result<StatusCounts, InquiryRepositoryError> {
        Ok(StatusCounts::default())
    }

    async fn save(
        &self,
        _inquiry: &Inquiry,
        _expected_revision: u32,
    ) -> Result<(), InquiryRepositoryError> {
        Ok(())
    }
}
