//! Inquiry HTTP handlers.
//!
//! ```text
//! POST /api/v1/inquiries
//! GET  /api/v1/inquiries/summary
//! GET  /api/v1/inquiries/{id}
//! POST /api/v1/inquiries/{id}/supplier-reply
//! POST /api/v1/inquiries/{id}/buyer-reply
//! POST /api/v1/inquiries/{id}/delete
//! POST /api/v1/inquiries/{id}/recover
//! POST /api/v1/inquiries/{id}/close
//! GET  /api/v1/buyer/inquiries?status=
//! GET  /api/v1/supplier/inquiries?status=
//! GET  /api/v1/admin/inquiries?status=
//! GET  /api/v1/session/principal
//! ```
//!
//! Handlers resolve the principal from the session and forward raw input to
//! the driving ports; validation and authorisation happen behind them.

use actix_web::{HttpResponse, get, post, web};

use crate::domain::ports::{
    GetInquiryRequest, InquiryActionRequest, ListInquiriesRequest, ReplyRequest,
    SubmitInquiryRequest,
};
use crate::domain::{Error, Inquiry, Principal};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_inquiry_id, parse_status_filter};

use super::inquiries_dto::{
    InquiryBody, InquiryPath, ReplyBody, StatusQuery, SubmitInquiryBody, SummaryBody,
};

/// Register the inquiry routes.
///
/// The summary route is registered ahead of `/inquiries/{id}` so the literal
/// segment wins.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(submit_inquiry)
        .service(inquiry_summary)
        .service(get_inquiry)
        .service(supplier_reply)
        .service(buyer_reply)
        .service(delete_inquiry)
        .service(recover_inquiry)
        .service(close_inquiry)
        .service(list_buyer_inquiries)
        .service(list_supplier_inquiries)
        .service(list_all_inquiries)
        .service(current_principal);
}

fn action(
    state: &HttpState,
    session: &SessionContext,
    path: web::Path<InquiryPath>,
) -> Result<InquiryActionRequest, Error> {
    Ok(InquiryActionRequest {
        principal: session.principal(&state.identity),
        inquiry_id: parse_inquiry_id(&path.into_inner().id)?,
    })
}

fn reply(
    state: &HttpState,
    session: &SessionContext,
    path: web::Path<InquiryPath>,
    payload: web::Json<ReplyBody>,
) -> Result<ReplyRequest, Error> {
    Ok(ReplyRequest {
        principal: session.principal(&state.identity),
        inquiry_id: parse_inquiry_id(&path.into_inner().id)?,
        text: payload.into_inner().text,
    })
}

fn listing(
    state: &HttpState,
    session: &SessionContext,
    query: web::Query<StatusQuery>,
) -> Result<ListInquiriesRequest, Error> {
    Ok(ListInquiriesRequest {
        principal: session.principal(&state.identity),
        filter: parse_status_filter(query.status.as_deref())?,
    })
}

fn bodies(inquiries: &[Inquiry]) -> Vec<InquiryBody> {
    inquiries.iter().map(InquiryBody::from).collect()
}

/// Submit a new inquiry as a buyer.
#[utoipa::path(
    post,
    path = "/api/v1/inquiries",
    request_body = SubmitInquiryBody,
    responses(
        (status = 201, description = "Inquiry submitted", body = InquiryBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 503, description = "Product catalogue unavailable", body = Error)
    ),
    tags = ["inquiries"],
    operation_id = "submit",
    security(("SessionCookie" = []))
)]
#[post("/inquiries")]
pub async fn submit_inquiry(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SubmitInquiryBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let inquiry = state
        .inquiries
        .submit(SubmitInquiryRequest {
            principal: session.principal(&state.identity),
            supplier_id: body.supplier_id,
            product_id: body.product_id,
            subject: body.subject,
            message: body.message,
            quantity: body.quantity,
        })
        .await?;
    Ok(HttpResponse::Created().json(InquiryBody::from(&inquiry)))
}

/// Per-status counts for the caller's own inquiries (all inquiries for
/// admins).
#[utoipa::path(
    get,
    path = "/api/v1/inquiries/summary",
    responses(
        (status = 200, description = "Status counts", body = SummaryBody),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["inquiries"],
    operation_id = "summary",
    security(("SessionCookie" = []))
)]
#[get("/inquiries/summary")]
pub async fn inquiry_summary(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SummaryBody>> {
    let summary = state
        .inquiries_query
        .summary(session.principal(&state.identity))
        .await?;
    Ok(web::Json(SummaryBody::from(summary)))
}

/// Fetch one inquiry visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/inquiries/{id}",
    params(("id" = String, Path, description = "Inquiry identifier")),
    responses(
        (status = 200, description = "Inquiry", body = InquiryBody),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["inquiries"],
    operation_id = "getById",
    security(("SessionCookie" = []))
)]
#[get("/inquiries/{id}")]
pub async fn get_inquiry(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<InquiryPath>,
) -> ApiResult<web::Json<InquiryBody>> {
    let inquiry = state
        .inquiries_query
        .get_by_id(GetInquiryRequest {
            principal: session.principal(&state.identity),
            inquiry_id: parse_inquiry_id(&path.into_inner().id)?,
        })
        .await?;
    Ok(web::Json(InquiryBody::from(&inquiry)))
}

/// Record the supplier's reply to a pending inquiry.
#[utoipa::path(
    post,
    path = "/api/v1/inquiries/{id}/supplier-reply",
    params(("id" = String, Path, description = "Inquiry identifier")),
    request_body = ReplyBody,
    responses(
        (status = 200, description = "Inquiry replied", body = InquiryBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Invalid state or write conflict", body = Error)
    ),
    tags = ["inquiries"],
    operation_id = "supplierReply",
    security(("SessionCookie" = []))
)]
#[post("/inquiries/{id}/supplier-reply")]
pub async fn supplier_reply(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<InquiryPath>,
    payload: web::Json<ReplyBody>,
) -> ApiResult<web::Json<InquiryBody>> {
    let request = reply(&state, &session, path, payload)?;
    let inquiry = state.inquiries.supplier_reply(request).await?;
    Ok(web::Json(InquiryBody::from(&inquiry)))
}

/// Record the buyer's single follow-up to the supplier's reply.
#[utoipa::path(
    post,
    path = "/api/v1/inquiries/{id}/buyer-reply",
    params(("id" = String, Path, description = "Inquiry identifier")),
    request_body = ReplyBody,
    responses(
        (status = 200, description = "Buyer reply recorded", body = InquiryBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Invalid state, duplicate reply or write conflict", body = Error)
    ),
    tags = ["inquiries"],
    operation_id = "buyerReply",
    security(("SessionCookie" = []))
)]
#[post("/inquiries/{id}/buyer-reply")]
pub async fn buyer_reply(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<InquiryPath>,
    payload: web::Json<ReplyBody>,
) -> ApiResult<web::Json<InquiryBody>> {
    let request = reply(&state, &session, path, payload)?;
    let inquiry = state.inquiries.buyer_reply(request).await?;
    Ok(web::Json(InquiryBody::from(&inquiry)))
}

/// Soft-delete an inquiry (supplier, or admin moderation).
#[utoipa::path(
    post,
    path = "/api/v1/inquiries/{id}/delete",
    params(("id" = String, Path, description = "Inquiry identifier")),
    responses(
        (status = 200, description = "Inquiry deleted", body = InquiryBody),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Invalid state or write conflict", body = Error)
    ),
    tags = ["inquiries"],
    operation_id = "softDelete",
    security(("SessionCookie" = []))
)]
#[post("/inquiries/{id}/delete")]
pub async fn delete_inquiry(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<InquiryPath>,
) -> ApiResult<web::Json<InquiryBody>> {
    let inquiry = state
        .inquiries
        .soft_delete(action(&state, &session, path)?)
        .await?;
    Ok(web::Json(InquiryBody::from(&inquiry)))
}

/// Restore a soft-deleted inquiry to its previous status.
#[utoipa::path(
    post,
    path = "/api/v1/inquiries/{id}/recover",
    params(("id" = String, Path, description = "Inquiry identifier")),
    responses(
        (status = 200, description = "Inquiry recovered", body = InquiryBody),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Invalid state or write conflict", body = Error)
    ),
    tags = ["inquiries"],
    operation_id = "recover",
    security(("SessionCookie" = []))
)]
#[post("/inquiries/{id}/recover")]
pub async fn recover_inquiry(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<InquiryPath>,
) -> ApiResult<web::Json<InquiryBody>> {
    let inquiry = state
        .inquiries
        .recover(action(&state, &session, path)?)
        .await?;
    Ok(web::Json(InquiryBody::from(&inquiry)))
}

/// Close an inquiry (admin only).
#[utoipa::path(
    post,
    path = "/api/v1/inquiries/{id}/close",
    params(("id" = String, Path, description = "Inquiry identifier")),
    responses(
        (status = 200, description = "Inquiry closed", body = InquiryBody),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Invalid state or write conflict", body = Error)
    ),
    tags = ["inquiries"],
    operation_id = "close",
    security(("SessionCookie" = []))
)]
#[post("/inquiries/{id}/close")]
pub async fn close_inquiry(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<InquiryPath>,
) -> ApiResult<web::Json<InquiryBody>> {
    let inquiry = state
        .inquiries
        .close(action(&state, &session, path)?)
        .await?;
    Ok(web::Json(InquiryBody::from(&inquiry)))
}

/// Inquiries the caller sent as a buyer, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/buyer/inquiries",
    params(("status" = Option<String>, Query, description = "pending, replied, closed or deleted")),
    responses(
        (status = 200, description = "Inquiries", body = [InquiryBody]),
        (status = 400, description = "Invalid status", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["inquiries"],
    operation_id = "listForBuyer",
    security(("SessionCookie" = []))
)]
#[get("/buyer/inquiries")]
pub async fn list_buyer_inquiries(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<StatusQuery>,
) -> ApiResult<web::Json<Vec<InquiryBody>>> {
    let inquiries = state
        .inquiries_query
        .list_for_buyer(listing(&state, &session, query)?)
        .await?;
    Ok(web::Json(bodies(&inquiries)))
}

/// Inquiries addressed to the caller as a supplier, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/supplier/inquiries",
    params(("status" = Option<String>, Query, description = "pending, replied, closed or deleted")),
    responses(
        (status = 200, description = "Inquiries", body = [InquiryBody]),
        (status = 400, description = "Invalid status", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["inquiries"],
    operation_id = "listForSupplier",
    security(("SessionCookie" = []))
)]
#[get("/supplier/inquiries")]
pub async fn list_supplier_inquiries(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<StatusQuery>,
) -> ApiResult<web::Json<Vec<InquiryBody>>> {
    let inquiries = state
        .inquiries_query
        .list_for_supplier(listing(&state, &session, query)?)
        .await?;
    Ok(web::Json(bodies(&inquiries)))
}

/// Every inquiry on the marketplace (admin only), newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/inquiries",
    params(("status" = Option<String>, Query, description = "pending, replied, closed or deleted")),
    responses(
        (status = 200, description = "Inquiries", body = [InquiryBody]),
        (status = 400, description = "Invalid status", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["inquiries"],
    operation_id = "listAll",
    security(("SessionCookie" = []))
)]
#[get("/admin/inquiries")]
pub async fn list_all_inquiries(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<StatusQuery>,
) -> ApiResult<web::Json<Vec<InquiryBody>>> {
    let inquiries = state
        .inquiries_query
        .list_all(listing(&state, &session, query)?)
        .await?;
    Ok(web::Json(bodies(&inquiries)))
}

/// The principal the session currently resolves to.
#[utoipa::path(
    get,
    path = "/api/v1/session/principal",
    responses(
        (status = 200, description = "Resolved principal", body = Principal),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["session"],
    operation_id = "whoami",
    security(("SessionCookie" = []))
)]
#[get("/session/principal")]
pub async fn current_principal(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Principal>> {
    session
        .principal(&state.identity)
        .map(web::Json)
        .ok_or_else(|| Error::not_authenticated("no identity in session"))
}

#[cfg(test)]
#[path = "inquiries_tests.rs"]
mod tests;
