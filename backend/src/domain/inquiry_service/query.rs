//! Read side of the inquiry service.

use async_trait::async_trait;

use super::{InquiryService, authenticated, check, map_repository_error, not_found};
use crate::domain::ports::{
    GetInquiryRequest, InquiryQuery, InquiryRepository, InquirySummary, InquiryScope,
    ListInquiriesRequest, ProductCatalogue,
};
use crate::domain::{
    Error, Inquiry, InquiryStatusKind, Operation, OperationKind, Principal, Role,
};

fn summary_scope(principal: &Principal) -> InquiryScope {
    match principal.role() {
        Role::Admin => InquiryScope::All,
        Role::Supplier => InquiryScope::Supplier(principal.id().clone()),
        Role::Buyer => InquiryScope::Buyer(principal.id().clone()),
    }
}

/// Deleted inquiries are hidden from their buyer; only the supplier and
/// moderators can still see them.
fn hidden_from(principal: &Principal, inquiry: &Inquiry) -> bool {
    inquiry.status().is_deleted()
        && !principal.is_admin()
        && inquiry.supplier_id() != principal.id()
}

#[async_trait]
impl<R, C> InquiryQuery for InquiryService<R, C>
where
    R: InquiryRepository + ?Sized,
    C: ProductCatalogue + ?Sized,
{
    async fn get_by_id(&self, request: GetInquiryRequest) -> Result<Inquiry, Error> {
        let principal = authenticated(request.principal.as_ref(), OperationKind::ViewInquiry)?;
        let inquiry = self.load(request.inquiry_id).await?;
        check(principal, Operation::ViewInquiry(&inquiry))?;
        if hidden_from(principal, &inquiry) {
            return Err(not_found(request.inquiry_id));
        }
        Ok(inquiry)
    }

    async fn list_for_buyer(&self, request: ListInquiriesRequest) -> Result<Vec<Inquiry>, Error> {
        let principal = authenticated(request.principal.as_ref(), OperationKind::ListAsBuyer)?;
        check(principal, Operation::ListAsBuyer)?;
        if request.filter.status == Some(InquiryStatusKind::Deleted) {
            return Ok(Vec::new());
        }
        self.repo
            .list_for_buyer(principal.id(), &request.filter)
            .await
            .map_err(map_repository_error)
    }

    async fn list_for_supplier(
        &self,
        request: ListInquiriesRequest,
    ) -> Result<Vec<Inquiry>, Error> {
        let principal = authenticated(request.principal.as_ref(), OperationKind::ListAsSupplier)?;
        check(principal, Operation::ListAsSupplier)?;
        self.repo
            .list_for_supplier(principal.id(), &request.filter)
            .await
            .map_err(map_repository_error)
    }

    async fn list_all(&self, request: ListInquiriesRequest) -> Result<Vec<Inquiry>, Error> {
        let principal = authenticated(request.principal.as_ref(), OperationKind::ListAll)?;
        check(principal, Operation::ListAll)?;
        self.repo
            .list_all(&request.filter)
            .await
            .map_err(map_repository_error)
    }

    async fn summary(&self, principal: Option<Principal>) -> Result<InquirySummary, Error> {
        let principal = authenticated(principal.as_ref(), OperationKind::ViewSummary)?;
        check(principal, Operation::ViewSummary)?;
        let scope = summary_scope(principal);
        let mut counts = self
            .repo
            .count_by_status(&scope)
            .await
            .map_err(map_repository_error)?;
        if matches!(scope, InquiryScope::Buyer(_)) {
            counts.deleted = 0;
        }
        Ok(InquirySummary { counts })
    }
}
