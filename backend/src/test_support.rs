//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests
//! or when the `test-support` feature is enabled.

mod clock;
mod dispatcher;

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{
    Inquiry, InquiryDraft, InquiryId, MessageBody, PrincipalId, Quantity, Subject,
};

pub use clock::MutableClock;
pub use dispatcher::{FailingDispatcher, RecordingDispatcher};

/// Fixed instant used by fixtures.
pub fn fixture_timestamp() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single() {
        Some(ts) => ts,
        None => panic!("valid fixture timestamp"),
    }
}

/// Parse a principal id, panicking on invalid fixtures.
pub fn principal_id(raw: &str) -> PrincipalId {
    PrincipalId::new(raw).unwrap_or_else(|err| panic!("fixture principal id {raw:?}: {err}"))
}

/// Parse a message body, panicking on invalid fixtures.
pub fn body(raw: &str) -> MessageBody {
    MessageBody::new(raw, "text").unwrap_or_else(|err| panic!("fixture body {raw:?}: {err}"))
}

/// A pending inquiry from `buyer` to `supplier` created at `created_at`.
pub fn pending_inquiry_at(buyer: &str, supplier: &str, created_at: DateTime<Utc>) -> Inquiry {
    let draft = InquiryDraft {
        buyer_id: principal_id(buyer),
        supplier_id: principal_id(supplier),
        product_id: None,
        subject: Subject::new("Bulk pricing").unwrap_or_else(|err| panic!("subject: {err}")),
        message: body("Is this available in bulk?"),
        quantity: Quantity::new(10).unwrap_or_else(|err| panic!("quantity: {err}")),
    };
    Inquiry::submit(draft, InquiryId::random(), created_at)
        .unwrap_or_else(|err| panic!("fixture inquiry: {err}"))
}

/// A pending inquiry from `buyer` to `supplier`.
pub fn pending_inquiry(buyer: &str, supplier: &str) -> Inquiry {
    pending_inquiry_at(buyer, supplier, fixture_timestamp())
}

/// A pending inquiry after the supplier replied.
pub fn replied_inquiry(buyer: &str, supplier: &str) -> Inquiry {
    pending_inquiry(buyer, supplier)
        .supplier_reply_with(body("Yes, available"), fixture_timestamp())
        .unwrap_or_else(|err| panic!("fixture reply: {err}"))
}
