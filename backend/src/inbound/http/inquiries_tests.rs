//! Tests for inquiry HTTP handlers.

use super::*;
use crate::domain::ports::{
    FixtureInquiryCommand, InquiryCommand, InquiryQuery, MockInquiryQuery, ProductSummary,
};
use crate::domain::{
    IdentityResolver, InquiryService, ProductId, Quantity, Role, StoredIdentity,
};
use crate::inbound::http::session::IdentitySlot;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
use crate::outbound::catalogue::InMemoryProductCatalogue;
use crate::outbound::persistence::InMemoryInquiryRepository;
use crate::test_support::{MutableClock, fixture_timestamp, principal_id};
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, test as actix_test, web};
use serde_json::{Value, json};
use std::sync::Arc;

const BUYER: &str = "7";
const SUPPLIER: &str = "11";
const ADMIN: &str = "999";

fn service_state() -> HttpState {
    let catalogue = InMemoryProductCatalogue::new().with_product(
        ProductId::new("P-100").expect("product id"),
        ProductSummary {
            supplier_id: principal_id(SUPPLIER),
            min_order_quantity: Quantity::new(50).expect("quantity"),
        },
    );
    let service = Arc::new(InquiryService::new(
        Arc::new(InMemoryInquiryRepository::new()),
        Arc::new(catalogue),
        Arc::new(MutableClock::new(fixture_timestamp())),
    ));
    HttpState::new(
        service.clone(),
        service,
        IdentityResolver::new(Some(principal_id(ADMIN))),
    )
}

async fn stand_in_login(
    session: SessionContext,
    path: web::Path<(String, String, String)>,
) -> ApiResult<HttpResponse> {
    let (slot, role, id) = path.into_inner();
    let slot = if slot == "admin" {
        IdentitySlot::Admin
    } else {
        IdentitySlot::Ordinary
    };
    let role = match role.as_str() {
        "buyer" => Role::Buyer,
        "supplier" => Role::Supplier,
        _ => Role::Admin,
    };
    let record = StoredIdentity::new(principal_id(&id), role).verified_and_approved();
    session.persist_identity(slot, &record)?;
    Ok(HttpResponse::NoContent().finish())
}

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .route(
            "/test/login/{slot}/{role}/{id}",
            web::post().to(stand_in_login),
        )
        .service(web::scope("/api/v1").configure(configure))
}

async fn login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    slot: &str,
    role: &str,
    id: &str,
    existing: Option<Cookie<'static>>,
) -> Cookie<'static> {
    let mut request =
        actix_test::TestRequest::post().uri(&format!("/test/login/{slot}/{role}/{id}"));
    if let Some(cookie) = existing {
        request = request.cookie(cookie);
    }
    let response = actix_test::call_service(app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    session_cookie(&response)
}

async fn send(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    request: actix_test::TestRequest,
    cookie: Option<&Cookie<'static>>,
) -> (StatusCode, Value) {
    let request = match cookie {
        Some(cookie) => request.cookie(cookie.clone()),
        None => request,
    };
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn submit_payload(product: Option<&str>, quantity: Option<i64>) -> Value {
    json!({
        "supplierId": SUPPLIER,
        "productId": product,
        "subject": "Bulk pricing",
        "message": "Is this available in bulk?",
        "quantity": quantity,
    })
}

async fn submit_as_buyer(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: &Cookie<'static>,
) -> String {
    let (status, body) = send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/inquiries")
            .set_json(submit_payload(Some("P-100"), None)),
        Some(cookie),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().expect("inquiry id").to_owned()
}

#[actix_web::test]
async fn submit_defaults_quantity_to_minimum_order() {
    let app = actix_test::init_service(test_app(service_state())).await;
    let buyer = login(&app, "ordinary", "buyer", BUYER, None).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/inquiries")
            .set_json(submit_payload(Some("P-100"), None)),
        Some(&buyer),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantity"], 50);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["buyerId"], BUYER);
    assert_eq!(body["productId"], "P-100");
    assert_eq!(body["revision"], 1);
    assert!(body["supplierReply"].is_null());
}

#[actix_web::test]
async fn anonymous_submit_is_unauthorised() {
    let app = actix_test::init_service(test_app(service_state())).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/inquiries")
            .set_json(submit_payload(None, Some(5))),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "not_authenticated");
}

#[actix_web::test]
async fn suppliers_cannot_submit() {
    let app = actix_test::init_service(test_app(service_state())).await;
    let supplier = login(&app, "ordinary", "supplier", SUPPLIER, None).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/inquiries")
            .set_json(submit_payload(None, Some(5))),
        Some(&supplier),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "wrong_role");
}

#[actix_web::test]
async fn missing_quantity_without_product_is_rejected() {
    let app = actix_test::init_service(test_app(service_state())).await;
    let buyer = login(&app, "ordinary", "buyer", BUYER, None).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/inquiries")
            .set_json(submit_payload(None, None)),
        Some(&buyer),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "quantity_required");
}

#[actix_web::test]
async fn reply_flow_allows_a_single_buyer_reply() {
    let app = actix_test::init_service(test_app(service_state())).await;
    let buyer = login(&app, "ordinary", "buyer", BUYER, None).await;
    let supplier = login(&app, "ordinary", "supplier", SUPPLIER, None).await;
    let id = submit_as_buyer(&app, &buyer).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/inquiries/{id}/supplier-reply"))
            .set_json(json!({ "text": "Yes, available" })),
        Some(&supplier),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "replied");
    assert_eq!(body["supplierReply"], "Yes, available");

    let buyer_reply_request = || {
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/inquiries/{id}/buyer-reply"))
            .set_json(json!({ "text": "Great, send a quote" }))
    };
    let (first, body) = send(&app, buyer_reply_request(), Some(&buyer)).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(body["buyerReply"], "Great, send a quote");

    let (second, body) = send(&app, buyer_reply_request(), Some(&buyer)).await;
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["code"], "duplicate_reply");
}

#[actix_web::test]
async fn supplier_cannot_reply_twice() {
    let app = actix_test::init_service(test_app(service_state())).await;
    let buyer = login(&app, "ordinary", "buyer", BUYER, None).await;
    let supplier = login(&app, "ordinary", "supplier", SUPPLIER, None).await;
    let id = submit_as_buyer(&app, &buyer).await;

    let reply = || {
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/inquiries/{id}/supplier-reply"))
            .set_json(json!({ "text": "Yes, available" }))
    };
    assert_eq!(send(&app, reply(), Some(&supplier)).await.0, StatusCode::OK);

    let (status, body) = send(&app, reply(), Some(&supplier)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "invalid_state");
}

#[actix_web::test]
async fn deleted_inquiries_leave_listings_until_recovered() {
    let app = actix_test::init_service(test_app(service_state())).await;
    let buyer = login(&app, "ordinary", "buyer", BUYER, None).await;
    let supplier = login(&app, "ordinary", "supplier", SUPPLIER, None).await;
    let id = submit_as_buyer(&app, &buyer).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post().uri(&format!("/api/v1/inquiries/{id}/delete")),
        Some(&supplier),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "deleted");
    assert_eq!(body["statusBeforeDelete"], "pending");

    let (_, listed) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/supplier/inquiries"),
        Some(&supplier),
    )
    .await;
    assert_eq!(listed, json!([]));

    let (_, deleted) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/supplier/inquiries?status=deleted"),
        Some(&supplier),
    )
    .await;
    assert_eq!(deleted.as_array().map(Vec::len), Some(1));

    let (_, buyer_view) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/buyer/inquiries?status=deleted"),
        Some(&buyer),
    )
    .await;
    assert_eq!(buyer_view, json!([]));

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post().uri(&format!("/api/v1/inquiries/{id}/recover")),
        Some(&supplier),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert!(body.get("statusBeforeDelete").is_none());
}

#[actix_web::test]
async fn admin_slot_closes_and_lists_everything() {
    let app = actix_test::init_service(test_app(service_state())).await;
    let buyer = login(&app, "ordinary", "buyer", BUYER, None).await;
    let id = submit_as_buyer(&app, &buyer).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post().uri(&format!("/api/v1/inquiries/{id}/close")),
        Some(&buyer),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "wrong_role");

    let elevated = login(&app, "admin", "admin", ADMIN, Some(buyer)).await;
    let (status, body) = send(
        &app,
        actix_test::TestRequest::post().uri(&format!("/api/v1/inquiries/{id}/close")),
        Some(&elevated),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");

    let (status, listed) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/admin/inquiries?status=closed"),
        Some(&elevated),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn summary_is_not_shadowed_by_the_id_route() {
    let app = actix_test::init_service(test_app(service_state())).await;
    let buyer = login(&app, "ordinary", "buyer", BUYER, None).await;
    submit_as_buyer(&app, &buyer).await;
    submit_as_buyer(&app, &buyer).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/inquiries/summary"),
        Some(&buyer),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counts"]["pending"], 2);
    assert_eq!(body["openTotal"], 2);
}

#[actix_web::test]
async fn strangers_cannot_view_an_inquiry() {
    let app = actix_test::init_service(test_app(service_state())).await;
    let buyer = login(&app, "ordinary", "buyer", BUYER, None).await;
    let stranger = login(&app, "ordinary", "buyer", "8", None).await;
    let id = submit_as_buyer(&app, &buyer).await;

    let uri = format!("/api/v1/inquiries/{id}");
    let (owner_status, _) = send(&app, actix_test::TestRequest::get().uri(&uri), Some(&buyer)).await;
    let (stranger_status, body) =
        send(&app, actix_test::TestRequest::get().uri(&uri), Some(&stranger)).await;

    assert_eq!(owner_status, StatusCode::OK);
    assert_eq!(stranger_status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "not_owner");
}

#[actix_web::test]
async fn malformed_ids_and_filters_are_bad_requests() {
    let app = actix_test::init_service(test_app(service_state())).await;
    let buyer = login(&app, "ordinary", "buyer", BUYER, None).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/inquiries/not-a-uuid"),
        Some(&buyer),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "id");

    let (status, body) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/buyer/inquiries?status=archived"),
        Some(&buyer),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn whoami_reports_the_resolved_principal() {
    let app = actix_test::init_service(test_app(service_state())).await;

    let (anonymous, body) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/session/principal"),
        None,
    )
    .await;
    assert_eq!(anonymous, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "not_authenticated");

    let supplier = login(&app, "ordinary", "supplier", SUPPLIER, None).await;
    let (status, body) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/session/principal"),
        Some(&supplier),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], SUPPLIER);
    assert_eq!(body["role"], "supplier");
    assert_eq!(body["isSuperAdmin"], false);
}

#[actix_web::test]
async fn internal_query_failures_are_redacted() {
    let mut query = MockInquiryQuery::new();
    query
        .expect_list_all()
        .times(1)
        .return_once(|_| Err(Error::internal("connection refused by db-7")));
    let command: Arc<dyn InquiryCommand> = Arc::new(FixtureInquiryCommand);
    let query: Arc<dyn InquiryQuery> = Arc::new(query);
    let state = HttpState::new(command, query, IdentityResolver::default());
    let app = actix_test::init_service(test_app(state)).await;
    let admin = login(&app, "admin", "admin", ADMIN, None).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/admin/inquiries"),
        Some(&admin),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
}

#[actix_web::test]
async fn listing_forwards_the_parsed_filter() {
    let mut query = MockInquiryQuery::new();
    query
        .expect_list_for_supplier()
        .withf(|request| {
            request.filter.status == Some(crate::domain::InquiryStatusKind::Replied)
                && request.principal.is_some()
        })
        .times(1)
        .return_once(|_| Ok(Vec::new()));
    let state = HttpState::new(
        Arc::new(FixtureInquiryCommand),
        Arc::new(query),
        IdentityResolver::default(),
    );
    let app = actix_test::init_service(test_app(state)).await;
    let supplier = login(&app, "ordinary", "supplier", SUPPLIER, None).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/supplier/inquiries?status=replied"),
        Some(&supplier),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}
