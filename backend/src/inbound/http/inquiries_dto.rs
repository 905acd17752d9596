//! Wire shapes for the inquiry endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::InquirySummary;
use crate::domain::{Inquiry, InquiryStatusKind, StatusCounts};

#[derive(Debug, Deserialize)]
pub(super) struct InquiryPath {
    pub(super) id: String,
}

/// `?status=` filter accepted by the listing endpoints.
#[derive(Debug, Default, Deserialize)]
pub(super) struct StatusQuery {
    pub(super) status: Option<String>,
}

/// Request payload for `POST /api/v1/inquiries`.
///
/// `quantity` may be omitted when `productId` is given; the product's
/// minimum order quantity is used instead.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitInquiryBody {
    #[schema(example = "11")]
    pub supplier_id: String,
    #[serde(default)]
    #[schema(example = "P-100")]
    pub product_id: Option<String>,
    #[schema(example = "Bulk pricing")]
    pub subject: String,
    #[schema(example = "Is this available in bulk?")]
    pub message: String,
    #[serde(default)]
    #[schema(example = 50)]
    pub quantity: Option<i64>,
}

/// Request payload for the reply endpoints.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyBody {
    #[schema(example = "Yes, available")]
    pub text: String,
}

/// An inquiry as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InquiryBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub buyer_id: String,
    pub supplier_id: String,
    pub product_id: Option<String>,
    pub subject: String,
    pub message: String,
    pub quantity: u32,
    pub status: InquiryStatusKind,
    /// Status an inquiry returns to when recovered; only set while deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_before_delete: Option<InquiryStatusKind>,
    pub supplier_reply: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
    pub buyer_reply: Option<String>,
    pub buyer_replied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: u32,
}

impl From<&Inquiry> for InquiryBody {
    fn from(inquiry: &Inquiry) -> Self {
        let supplier_reply = inquiry.supplier_reply();
        let buyer_reply = inquiry.buyer_reply();
        Self {
            id: inquiry.id().to_string(),
            buyer_id: inquiry.buyer_id().to_string(),
            supplier_id: inquiry.supplier_id().to_string(),
            product_id: inquiry.product_id().map(ToString::to_string),
            subject: inquiry.subject().as_str().to_owned(),
            message: inquiry.message().as_str().to_owned(),
            quantity: inquiry.quantity().get(),
            status: inquiry.status().kind(),
            status_before_delete: inquiry.status().before_delete(),
            supplier_reply: supplier_reply.map(|reply| reply.text.as_str().to_owned()),
            replied_at: supplier_reply.map(|reply| reply.at),
            buyer_reply: buyer_reply.map(|reply| reply.text.as_str().to_owned()),
            buyer_replied_at: buyer_reply.map(|reply| reply.at),
            created_at: inquiry.created_at(),
            updated_at: inquiry.updated_at(),
            revision: inquiry.revision(),
        }
    }
}

/// Per-status counts for the caller's scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryBody {
    pub counts: StatusCounts,
    /// Inquiries that are not deleted.
    pub open_total: u64,
}

impl From<InquirySummary> for SummaryBody {
    fn from(summary: InquirySummary) -> Self {
        Self {
            counts: summary.counts,
            open_total: summary.counts.open_total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture_timestamp, replied_inquiry};
    use rstest::rstest;

    #[rstest]
    fn deleted_inquiries_expose_their_recovery_target() {
        let deleted = replied_inquiry("7", "11")
            .soft_delete(fixture_timestamp())
            .expect("deletable");

        let body = InquiryBody::from(&deleted);
        let json = serde_json::to_value(&body).expect("serialises");

        assert_eq!(json["status"], "deleted");
        assert_eq!(json["statusBeforeDelete"], "replied");
        assert_eq!(json["supplierReply"], "Yes, available");
        assert!(json["buyerReply"].is_null());
        assert_eq!(json["revision"], 3);
    }

    #[rstest]
    fn live_inquiries_omit_the_recovery_target() {
        let json = serde_json::to_value(InquiryBody::from(&replied_inquiry("7", "11")))
            .expect("serialises");
        assert!(json.get("statusBeforeDelete").is_none());
        assert_eq!(json["quantity"], 10);
    }
}
