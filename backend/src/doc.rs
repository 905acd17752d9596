//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every inquiry and health endpoint together with the
//! wire schemas and the session cookie security scheme. The document backs
//! Swagger UI in debug builds and is exported by `openapi-dump` for client
//! generation.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, InquiryStatusKind, Principal, Role, StatusCounts};
use crate::inbound::http::inquiries_dto::{InquiryBody, ReplyBody, SubmitInquiryBody, SummaryBody};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Signed session cookie issued by the marketplace login service.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Inquiry backend API",
        description = "Buyer-to-supplier inquiry lifecycle with dual-slot session identities."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::inquiries::submit_inquiry,
        crate::inbound::http::inquiries::inquiry_summary,
        crate::inbound::http::inquiries::get_inquiry,
        crate::inbound::http::inquiries::supplier_reply,
        crate::inbound::http::inquiries::buyer_reply,
        crate::inbound::http::inquiries::delete_inquiry,
        crate::inbound::http::inquiries::recover_inquiry,
        crate::inbound::http::inquiries::close_inquiry,
        crate::inbound::http::inquiries::list_buyer_inquiries,
        crate::inbound::http::inquiries::list_supplier_inquiries,
        crate::inbound::http::inquiries::list_all_inquiries,
        crate::inbound::http::inquiries::current_principal,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        InquiryBody,
        SubmitInquiryBody,
        ReplyBody,
        SummaryBody,
        StatusCounts,
        InquiryStatusKind,
        Principal,
        Role,
        Error,
        ErrorCode
    )),
    tags(
        (name = "inquiries", description = "Inquiry submission, replies and moderation"),
        (name = "session", description = "Identity resolved from the session cookie"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_has_field(schema: &RefOr<Schema>, field: &str) -> bool {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.contains_key(field),
            _ => false,
        }
    }

    #[rstest]
    #[case("/api/v1/inquiries")]
    #[case("/api/v1/inquiries/summary")]
    #[case("/api/v1/inquiries/{id}")]
    #[case("/api/v1/inquiries/{id}/supplier-reply")]
    #[case("/api/v1/inquiries/{id}/buyer-reply")]
    #[case("/api/v1/inquiries/{id}/delete")]
    #[case("/api/v1/inquiries/{id}/recover")]
    #[case("/api/v1/inquiries/{id}/close")]
    #[case("/api/v1/buyer/inquiries")]
    #[case("/api/v1/supplier/inquiries")]
    #[case("/api/v1/admin/inquiries")]
    #[case("/api/v1/session/principal")]
    #[case("/health/ready")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "{path} missing from document");
    }

    #[rstest]
    fn inquiry_schema_uses_camel_case_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let inquiry = schemas.get("InquiryBody").expect("InquiryBody schema");

        for field in ["buyerId", "supplierId", "statusBeforeDelete", "buyerRepliedAt", "revision"] {
            assert!(object_has_field(inquiry, field), "InquiryBody lacks {field}");
        }
    }

    #[rstest]
    fn error_schema_exposes_code_and_message() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error = schemas.get("Error").expect("Error schema");

        assert!(object_has_field(error, "code"));
        assert!(object_has_field(error, "message"));
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
