//! Validation helpers for path and query input.

use serde_json::json;

use crate::domain::{Error, InquiryId, InquiryListFilter, InquiryStatusKind};

/// Validation error codes for HTTP input failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputErrorCode {
    InvalidUuid,
    InvalidStatus,
}

impl InputErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidStatus => "invalid_status",
        }
    }
}

fn input_error(field: &str, value: &str, code: InputErrorCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
        "code": code.as_str(),
    }))
}

/// Parse the `{id}` path segment.
pub(crate) fn parse_inquiry_id(value: &str) -> Result<InquiryId, Error> {
    value.parse().map_err(|_| {
        input_error(
            "id",
            value,
            InputErrorCode::InvalidUuid,
            "id must be a valid UUID".to_owned(),
        )
    })
}

/// Build a listing filter from the optional `status` query parameter.
pub(crate) fn parse_status_filter(value: Option<&str>) -> Result<InquiryListFilter, Error> {
    let Some(raw) = value else {
        return Ok(InquiryListFilter::default());
    };
    raw.parse::<InquiryStatusKind>()
        .map(InquiryListFilter::with_status)
        .map_err(|_| {
            let allowed: Vec<&str> = InquiryStatusKind::ALL.iter().map(|kind| kind.as_str()).collect();
            input_error(
                "status",
                raw,
                InputErrorCode::InvalidStatus,
                format!("status must be one of {}", allowed.join(", ")),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn inquiry_ids_must_be_uuids() {
        let err = parse_inquiry_id("abc").expect_err("not a uuid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details(),
            Some(&json!({"field": "id", "value": "abc", "code": "invalid_uuid"}))
        );
        assert!(parse_inquiry_id("3fa85f64-5717-4562-b3fc-2c963f66afa6").is_ok());
    }

    #[rstest]
    #[case::absent(None, None)]
    #[case::pending(Some("pending"), Some(InquiryStatusKind::Pending))]
    #[case::deleted(Some("deleted"), Some(InquiryStatusKind::Deleted))]
    fn status_filters_parse(
        #[case] raw: Option<&str>,
        #[case] expected: Option<InquiryStatusKind>,
    ) {
        let filter = parse_status_filter(raw).expect("valid status");
        assert_eq!(filter.status, expected);
    }

    #[rstest]
    fn unknown_status_is_rejected() {
        let err = parse_status_filter(Some("archived")).expect_err("unknown status");
        assert_eq!(
            err.message(),
            "status must be one of pending, replied, closed, deleted"
        );
    }
}
