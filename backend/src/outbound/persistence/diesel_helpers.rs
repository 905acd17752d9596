//! Shared helpers for the Diesel repository.
//!
//! - Error mapping from pool and Diesel errors to the port error.
//! - Revision casting between database and domain types.
//! - Disambiguation of zero-row optimistic updates.

use tracing::debug;

use crate::domain::ports::InquiryRepositoryError;

use super::pool::PoolError;

/// Map pool errors to repository connection errors.
pub fn map_pool_error(error: PoolError) -> InquiryRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            InquiryRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to repository errors.
pub fn map_diesel_error(error: diesel::result::Error) -> InquiryRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(%error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => InquiryRepositoryError::query("record not found"),
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::UniqueViolation => {
                InquiryRepositoryError::duplicate(info.constraint_name().unwrap_or("inquiries_pkey"))
            }
            DatabaseErrorKind::ClosedConnection => {
                InquiryRepositoryError::connection("database connection error")
            }
            _ => InquiryRepositoryError::query("database error"),
        },
        _ => InquiryRepositoryError::query("database error"),
    }
}

/// Cast database revision (i32) to domain revision (u32).
///
/// The `revision >= 1` check constraint keeps stored values positive.
#[expect(
    clippy::cast_sign_loss,
    reason = "revision is always positive in the database"
)]
pub fn cast_revision(revision: i32) -> u32 {
    revision as u32
}

/// Cast domain revision (u32) to database revision (i32).
#[expect(
    clippy::cast_possible_wrap,
    reason = "revisions grow by one per transition and stay far below i32::MAX"
)]
pub fn cast_revision_for_db(revision: u32) -> i32 {
    revision as i32
}

/// Outcome of a revision-guarded `UPDATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    Success,
    /// Zero rows matched: stale revision or missing record.
    ZeroRows,
}

pub fn execute_optimistic_update(updated_rows: usize) -> UpdateResult {
    if updated_rows == 0 {
        UpdateResult::ZeroRows
    } else {
        UpdateResult::Success
    }
}

/// Turn a zero-row update into the precise error, given the revision now
/// stored for the inquiry (`None` when the row is gone).
pub fn disambiguate_update_failure(
    current_revision: Result<Option<u32>, InquiryRepositoryError>,
    expected_revision: u32,
    inquiry_id: &str,
) -> InquiryRepositoryError {
    match current_revision {
        Ok(Some(actual)) => InquiryRepositoryError::revision_mismatch(expected_revision, actual),
        Ok(None) => InquiryRepositoryError::missing(inquiry_id),
        Err(error) => error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, UpdateResult::ZeroRows)]
    #[case(1, UpdateResult::Success)]
    fn optimistic_update_counts_rows(#[case] rows: usize, #[case] expected: UpdateResult) {
        assert_eq!(execute_optimistic_update(rows), expected);
    }

    #[rstest]
    fn zero_rows_with_a_newer_revision_is_a_mismatch() {
        let err = disambiguate_update_failure(Ok(Some(4)), 3, "abc");
        assert_eq!(err, InquiryRepositoryError::revision_mismatch(3_u32, 4_u32));
    }

    #[rstest]
    fn zero_rows_without_a_row_is_missing() {
        let err = disambiguate_update_failure(Ok(None), 3, "abc");
        assert_eq!(err, InquiryRepositoryError::missing("abc"));
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, InquiryRepositoryError::connection("timed out"));
    }

    #[rstest]
    fn diesel_not_found_maps_to_query_error() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, InquiryRepositoryError::Query { .. }));
    }
}
