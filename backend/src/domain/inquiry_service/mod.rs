//! Inquiry lifecycle service implementing the driving ports.
//!
//! Every command follows the same pipeline: resolve the caller, load the
//! inquiry, ask the access guard, apply the pure transition, save with an
//! optimistic revision check and finally hand the committed event to the
//! post-commit hooks. When the save loses a race the service reloads and
//! re-runs the guard and transition, up to `max_conflict_retries` times.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    InquiryActionRequest, InquiryCommand, InquiryRepository, InquiryRepositoryError,
    ProductCatalogue, ProductCatalogueError, ProductSummary, ReplyRequest, SubmitInquiryRequest,
};
use crate::domain::{
    CommittedTransition, Decision, DenialReason, Error, Inquiry, InquiryDraft, InquiryEvent,
    InquiryId, InquiryValidationError, MessageBody, Operation, OperationKind, PostCommitHooks,
    Principal, PrincipalId, ProductId, Quantity, Subject, Transition, TransitionError, authorize,
};

mod query;

/// Reload-and-retry budget applied when a save loses a revision race.
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 2;

/// Inquiry service implementing [`InquiryCommand`] and
/// [`crate::domain::ports::InquiryQuery`].
#[derive(Clone)]
pub struct InquiryService<R: ?Sized, C: ?Sized> {
    repo: Arc<R>,
    catalogue: Arc<C>,
    hooks: PostCommitHooks,
    clock: Arc<dyn Clock>,
    max_conflict_retries: u32,
}

impl<R: ?Sized, C: ?Sized> InquiryService<R, C> {
    /// Create a service with no post-commit hooks and the default retry
    /// budget.
    pub fn new(repo: Arc<R>, catalogue: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            catalogue,
            hooks: PostCommitHooks::default(),
            clock,
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }

    /// Replace the post-commit hook list.
    pub fn with_hooks(mut self, hooks: PostCommitHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Override how many times a lost revision race is retried.
    pub fn with_max_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }
}

pub(super) fn authenticated(
    principal: Option<&Principal>,
    operation: OperationKind,
) -> Result<&Principal, Error> {
    match principal {
        Some(principal) => Ok(principal),
        None => Err(denied(DenialReason::NotAuthenticated, operation)),
    }
}

fn denied(reason: DenialReason, operation: OperationKind) -> Error {
    debug!(operation = %operation, reason = reason.code().as_str(), "access denied");
    match Decision::Denied(reason).into_result(operation) {
        Err(error) => error,
        Ok(()) => Error::internal("denial produced no error"),
    }
}

pub(super) fn check(principal: &Principal, operation: Operation<'_>) -> Result<(), Error> {
    match authorize(Some(principal), operation) {
        Decision::Allowed => Ok(()),
        Decision::Denied(reason) => Err(denied(reason, operation.kind())),
    }
}

pub(super) fn map_repository_error(error: InquiryRepositoryError) -> Error {
    match error {
        InquiryRepositoryError::Connection { message } => {
            Error::internal(format!("inquiry repository unavailable: {message}"))
        }
        InquiryRepositoryError::Query { message } => {
            Error::internal(format!("inquiry repository error: {message}"))
        }
        InquiryRepositoryError::RevisionMismatch { expected, actual } => {
            write_conflict(expected, actual)
        }
        InquiryRepositoryError::Duplicate { id } => {
            Error::internal(format!("inquiry id collision: {id}"))
        }
        InquiryRepositoryError::Missing { id } => {
            Error::not_found("inquiry not found").with_details(json!({ "inquiryId": id }))
        }
    }
}

fn write_conflict(expected: u32, actual: u32) -> Error {
    Error::write_conflict("the inquiry was changed by another request").with_details(json!({
        "expectedRevision": expected,
        "actualRevision": actual,
    }))
}

fn map_transition_error(error: TransitionError) -> Error {
    match error {
        TransitionError::InvalidState { from, .. } => {
            Error::invalid_state(error.to_string()).with_details(json!({ "status": from }))
        }
        TransitionError::DuplicateReply => Error::duplicate_reply(error.to_string()),
    }
}

fn map_validation_error(error: InquiryValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({ "field": error.field() }))
}

fn map_catalogue_error(error: ProductCatalogueError) -> Error {
    tracing::warn!(%error, "product lookup failed");
    Error::catalogue_unavailable("the product catalogue is unavailable")
}

pub(super) fn not_found(id: InquiryId) -> Error {
    Error::not_found("inquiry not found").with_details(json!({ "inquiryId": id.to_string() }))
}

impl<R, C> InquiryService<R, C>
where
    R: InquiryRepository + ?Sized,
    C: ProductCatalogue + ?Sized,
{
    pub(super) async fn load(&self, id: InquiryId) -> Result<Inquiry, Error> {
        self.repo
            .find_by_id(&id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(id))
    }

    async fn commit(&self, event: InquiryEvent, inquiry: Inquiry) -> Inquiry {
        info!(
            inquiry_id = %inquiry.id(),
            event = %event,
            revision = inquiry.revision(),
            status = %inquiry.status().kind(),
            "inquiry transition committed"
        );
        self.hooks
            .run(CommittedTransition {
                event,
                inquiry: inquiry.clone(),
            })
            .await;
        inquiry
    }

    /// Load, authorise, transition and save, retrying lost revision races.
    async fn transition<F>(
        &self,
        principal: Option<&Principal>,
        id: InquiryId,
        transition: Transition,
        kind: OperationKind,
        operation: F,
    ) -> Result<Inquiry, Error>
    where
        F: for<'a> Fn(&'a Inquiry) -> Operation<'a> + Send + Sync,
    {
        let principal = authenticated(principal, kind)?;
        let mut retries = 0;
        loop {
            let current = self.load(id).await?;
            check(principal, operation(&current))?;
            let next = transition
                .apply(&current, self.clock.utc())
                .map_err(map_transition_error)?;

            match self.repo.save(&next, current.revision()).await {
                Ok(()) => return Ok(self.commit(transition.event(), next).await),
                Err(InquiryRepositoryError::RevisionMismatch { expected, actual })
                    if retries < self.max_conflict_retries =>
                {
                    retries += 1;
                    debug!(
                        inquiry_id = %id,
                        expected,
                        actual,
                        retries,
                        "revision race lost; reloading"
                    );
                }
                Err(error) => return Err(map_repository_error(error)),
            }
        }
    }

    async fn resolve_product(
        &self,
        product_id: &ProductId,
        supplier_id: &PrincipalId,
    ) -> Result<ProductSummary, Error> {
        let summary = self
            .catalogue
            .lookup(product_id)
            .await
            .map_err(map_catalogue_error)?
            .ok_or_else(|| {
                Error::invalid_request("unknown product").with_details(json!({
                    "field": "productId",
                    "code": "unknown_product",
                }))
            })?;
        if &summary.supplier_id != supplier_id {
            return Err(
                Error::invalid_request("the product belongs to another supplier").with_details(
                    json!({
                        "field": "productId",
                        "code": "supplier_mismatch",
                    }),
                ),
            );
        }
        Ok(summary)
    }

    async fn build_draft(
        &self,
        buyer: &Principal,
        request: SubmitInquiryRequest,
    ) -> Result<InquiryDraft, Error> {
        let supplier_id = PrincipalId::new(request.supplier_id).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({ "field": "supplierId" }))
        })?;
        let subject = Subject::new(&request.subject).map_err(map_validation_error)?;
        let message = MessageBody::new(&request.message, "message").map_err(map_validation_error)?;
        let product_id = request
            .product_id
            .map(ProductId::new)
            .transpose()
            .map_err(map_validation_error)?;
        let requested = request
            .quantity
            .map(Quantity::new)
            .transpose()
            .map_err(map_validation_error)?;

        let quantity = match (&product_id, requested) {
            (Some(product_id), requested) => {
                let summary = self.resolve_product(product_id, &supplier_id).await?;
                requested.unwrap_or(summary.min_order_quantity)
            }
            (None, Some(quantity)) => quantity,
            (None, None) => {
                return Err(Error::invalid_request(
                    "quantity is required when no product is referenced",
                )
                .with_details(json!({ "field": "quantity", "code": "quantity_required" })));
            }
        };

        Ok(InquiryDraft {
            buyer_id: buyer.id().clone(),
            supplier_id,
            product_id,
            subject,
            message,
            quantity,
        })
    }
}

fn reply_body(text: &str) -> Result<MessageBody, Error> {
    MessageBody::new(text, "text").map_err(map_validation_error)
}

#[async_trait]
impl<R, C> InquiryCommand for InquiryService<R, C>
where
    R: InquiryRepository + ?Sized,
    C: ProductCatalogue + ?Sized,
{
    async fn submit(&self, request: SubmitInquiryRequest) -> Result<Inquiry, Error> {
        let principal = request.principal.clone();
        let buyer = authenticated(principal.as_ref(), OperationKind::CreateInquiry)?;
        check(buyer, Operation::CreateInquiry)?;

        let draft = self.build_draft(buyer, request).await?;
        let inquiry = Inquiry::submit(draft, InquiryId::random(), self.clock.utc())
            .map_err(map_validation_error)?;
        self.repo
            .create(&inquiry)
            .await
            .map_err(map_repository_error)?;

        Ok(self.commit(InquiryEvent::Submitted, inquiry).await)
    }

    async fn supplier_reply(&self, request: ReplyRequest) -> Result<Inquiry, Error> {
        let text = reply_body(&request.text)?;
        self.transition(
            request.principal.as_ref(),
            request.inquiry_id,
            Transition::SupplierReply(text),
            OperationKind::ReplyAsSupplier,
            |inquiry| Operation::ReplyAsSupplier(inquiry),
        )
        .await
    }

    async fn buyer_reply(&self, request: ReplyRequest) -> Result<Inquiry, Error> {
        let text = reply_body(&request.text)?;
        self.transition(
            request.principal.as_ref(),
            request.inquiry_id,
            Transition::BuyerReply(text),
            OperationKind::ReplyAsBuyer,
            |inquiry| Operation::ReplyAsBuyer(inquiry),
        )
        .await
    }

    async fn soft_delete(&self, request: InquiryActionRequest) -> Result<Inquiry, Error> {
        let moderating = request.principal.as_ref().is_some_and(Principal::is_admin);
        let kind = if moderating {
            OperationKind::ModerateDelete
        } else {
            OperationKind::DeleteInquiry
        };
        self.transition(
            request.principal.as_ref(),
            request.inquiry_id,
            Transition::SoftDelete,
            kind,
            move |inquiry| {
                if moderating {
                    Operation::ModerateDelete(inquiry)
                } else {
                    Operation::DeleteInquiry(inquiry)
                }
            },
        )
        .await
    }

    async fn recover(&self, request: InquiryActionRequest) -> Result<Inquiry, Error> {
        self.transition(
            request.principal.as_ref(),
            request.inquiry_id,
            Transition::Recover,
            OperationKind::RecoverInquiry,
            |inquiry| Operation::RecoverInquiry(inquiry),
        )
        .await
    }

    async fn close(&self, request: InquiryActionRequest) -> Result<Inquiry, Error> {
        self.transition(
            request.principal.as_ref(),
            request.inquiry_id,
            Transition::Close,
            OperationKind::CloseInquiry,
            |inquiry| Operation::CloseInquiry(inquiry),
        )
        .await
    }
}
