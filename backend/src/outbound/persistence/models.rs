//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversion to and from [`Inquiry`] lives
//! here so the repository only deals with queries.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Inquiry, InquiryId, InquiryParts, InquiryStatus, InquiryStatusKind, MessageBody, PrincipalId,
    ProductId, Quantity, RecoverableStatus, Reply, Subject,
};

use super::diesel_helpers::{cast_revision, cast_revision_for_db};
use super::schema::inquiries;

/// Row struct for reading from the inquiries table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = inquiries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InquiryRow {
    pub id: Uuid,
    pub buyer_id: String,
    pub supplier_id: String,
    pub product_id: Option<String>,
    pub subject: String,
    pub message: String,
    pub quantity: i32,
    pub status: String,
    pub status_before_delete: Option<String>,
    pub supplier_reply: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
    pub buyer_reply: Option<String>,
    pub buyer_replied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: i32,
}

/// Insertable struct for creating inquiry records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = inquiries)]
pub(crate) struct NewInquiryRow<'a> {
    pub id: Uuid,
    pub buyer_id: &'a str,
    pub supplier_id: &'a str,
    pub product_id: Option<&'a str>,
    pub subject: &'a str,
    pub message: &'a str,
    pub quantity: i32,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: i32,
}

/// Changeset applied by a committed transition.
///
/// `None` values clear the column, so recovering an inquiry removes its
/// `status_before_delete`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = inquiries)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct InquiryUpdate<'a> {
    pub status: &'static str,
    pub status_before_delete: Option<&'static str>,
    pub supplier_reply: Option<&'a str>,
    pub replied_at: Option<DateTime<Utc>>,
    pub buyer_reply: Option<&'a str>,
    pub buyer_replied_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub revision: i32,
}

impl<'a> NewInquiryRow<'a> {
    pub(crate) fn from_domain(inquiry: &'a Inquiry) -> Self {
        Self {
            id: *inquiry.id().as_uuid(),
            buyer_id: inquiry.buyer_id().as_ref(),
            supplier_id: inquiry.supplier_id().as_ref(),
            product_id: inquiry.product_id().map(|id| id.as_ref()),
            subject: inquiry.subject().as_str(),
            message: inquiry.message().as_str(),
            quantity: inquiry.quantity().as_i32(),
            status: inquiry.status().kind().as_str(),
            created_at: inquiry.created_at(),
            updated_at: inquiry.updated_at(),
            revision: cast_revision_for_db(inquiry.revision()),
        }
    }
}

impl<'a> InquiryUpdate<'a> {
    pub(crate) fn from_domain(inquiry: &'a Inquiry) -> Self {
        let supplier_reply = inquiry.supplier_reply();
        let buyer_reply = inquiry.buyer_reply();
        Self {
            status: inquiry.status().kind().as_str(),
            status_before_delete: inquiry.status().before_delete().map(InquiryStatusKind::as_str),
            supplier_reply: supplier_reply.map(|reply| reply.text.as_str()),
            replied_at: supplier_reply.map(|reply| reply.at),
            buyer_reply: buyer_reply.map(|reply| reply.text.as_str()),
            buyer_replied_at: buyer_reply.map(|reply| reply.at),
            updated_at: inquiry.updated_at(),
            revision: cast_revision_for_db(inquiry.revision()),
        }
    }
}

fn parse_status(
    status: &str,
    before_delete: Option<&str>,
) -> Result<InquiryStatus, String> {
    let kind: InquiryStatusKind = status.parse()?;
    Ok(match kind {
        InquiryStatusKind::Pending => InquiryStatus::Pending,
        InquiryStatusKind::Replied => InquiryStatus::Replied,
        InquiryStatusKind::Closed => InquiryStatus::Closed,
        InquiryStatusKind::Deleted => {
            let previous = match before_delete {
                Some("pending") => RecoverableStatus::Pending,
                Some("replied") => RecoverableStatus::Replied,
                other => return Err(format!("invalid status_before_delete: {other:?}")),
            };
            InquiryStatus::Deleted { previous }
        }
    })
}

fn paired_reply(
    text: Option<String>,
    at: Option<DateTime<Utc>>,
    field: &'static str,
) -> Result<Option<Reply>, String> {
    match (text, at) {
        (Some(text), Some(at)) => Ok(Some(Reply {
            text: MessageBody::new(text, field).map_err(|err| err.to_string())?,
            at,
        })),
        (None, None) => Ok(None),
        _ => Err(format!("{field} and its timestamp must be set together")),
    }
}

impl TryFrom<InquiryRow> for Inquiry {
    type Error = String;

    fn try_from(row: InquiryRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.status, row.status_before_delete.as_deref())?;
        let parts = InquiryParts {
            id: InquiryId::from_uuid(row.id),
            buyer_id: PrincipalId::new(row.buyer_id).map_err(|err| err.to_string())?,
            supplier_id: PrincipalId::new(row.supplier_id).map_err(|err| err.to_string())?,
            product_id: row
                .product_id
                .map(ProductId::new)
                .transpose()
                .map_err(|err| err.to_string())?,
            subject: Subject::new(row.subject).map_err(|err| err.to_string())?,
            message: MessageBody::new(row.message, "message").map_err(|err| err.to_string())?,
            quantity: Quantity::new(i64::from(row.quantity)).map_err(|err| err.to_string())?,
            status,
            supplier_reply: paired_reply(row.supplier_reply, row.replied_at, "supplierReply")?,
            buyer_reply: paired_reply(row.buyer_reply, row.buyer_replied_at, "buyerReply")?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            revision: cast_revision(row.revision),
        };
        Inquiry::from_parts(parts).map_err(|err| err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InquiryDraft;
    use crate::test_support::{body, fixture_timestamp, principal_id, replied_inquiry};
    use rstest::rstest;

    fn row_from(inquiry: &Inquiry) -> InquiryRow {
        let new_row = NewInquiryRow::from_domain(inquiry);
        let update = InquiryUpdate::from_domain(inquiry);
        InquiryRow {
            id: new_row.id,
            buyer_id: new_row.buyer_id.to_owned(),
            supplier_id: new_row.supplier_id.to_owned(),
            product_id: new_row.product_id.map(str::to_owned),
            subject: new_row.subject.to_owned(),
            message: new_row.message.to_owned(),
            quantity: new_row.quantity,
            status: update.status.to_owned(),
            status_before_delete: update.status_before_delete.map(str::to_owned),
            supplier_reply: update.supplier_reply.map(str::to_owned),
            replied_at: update.replied_at,
            buyer_reply: update.buyer_reply.map(str::to_owned),
            buyer_replied_at: update.buyer_replied_at,
            created_at: new_row.created_at,
            updated_at: update.updated_at,
            revision: update.revision,
        }
    }

    #[rstest]
    fn deleted_inquiry_survives_the_row_mapping() {
        let deleted = replied_inquiry("7", "11")
            .soft_delete(fixture_timestamp())
            .expect("deletable");

        let row = row_from(&deleted);
        assert_eq!(row.status, "deleted");
        assert_eq!(row.status_before_delete.as_deref(), Some("replied"));

        let restored = Inquiry::try_from(row).expect("valid row");
        assert_eq!(restored, deleted);
    }

    #[rstest]
    fn largest_quantity_is_stored_without_loss() {
        let draft = InquiryDraft {
            buyer_id: principal_id("7"),
            supplier_id: principal_id("11"),
            product_id: None,
            subject: Subject::new("Bulk pricing").expect("subject"),
            message: body("Quote for a full container"),
            quantity: Quantity::new(i64::from(i32::MAX)).expect("quantity"),
        };
        let inquiry =
            Inquiry::submit(draft, InquiryId::random(), fixture_timestamp()).expect("submit");

        let row = row_from(&inquiry);
        assert_eq!(row.quantity, i32::MAX);

        let restored = Inquiry::try_from(row).expect("valid row");
        assert_eq!(restored.quantity().get(), Quantity::MAX);
    }

    #[rstest]
    fn non_positive_stored_quantity_is_rejected() {
        let mut row = row_from(&replied_inquiry("7", "11"));
        row.quantity = 0;

        assert!(Inquiry::try_from(row).is_err());
    }

    #[rstest]
    fn unpaired_reply_columns_are_rejected() {
        let mut row = row_from(&replied_inquiry("7", "11"));
        row.replied_at = None;

        let err = Inquiry::try_from(row).expect_err("unpaired reply");
        assert!(err.contains("supplierReply"));
    }

    #[rstest]
    fn unknown_status_is_rejected() {
        let mut row = row_from(&replied_inquiry("7", "11"));
        row.status = "archived".to_owned();

        assert!(Inquiry::try_from(row).is_err());
    }
}
