//! PostgreSQL-backed `InquiryRepository` implementation using Diesel ORM.
//!
//! Saves are a single `UPDATE ... WHERE id = $1 AND revision = $2`; a
//! zero-row result is disambiguated into a revision mismatch or a missing
//! inquiry by re-reading the stored revision.

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{InquiryRepository, InquiryRepositoryError, InquiryScope};
use crate::domain::{
    Inquiry, InquiryId, InquiryListFilter, InquiryStatusKind, PrincipalId, StatusCounts,
};

use super::diesel_helpers::{
    UpdateResult, cast_revision, cast_revision_for_db, disambiguate_update_failure,
    execute_optimistic_update, map_diesel_error, map_pool_error,
};
use super::models::{InquiryRow, InquiryUpdate, NewInquiryRow};
use super::pool::DbPool;
use super::schema::inquiries;

type BoxedInquiryQuery<'a> = inquiries::BoxedQuery<'a, diesel::pg::Pg>;

/// Diesel-backed implementation of the `InquiryRepository` port.
#[derive(Clone)]
pub struct DieselInquiryRepository {
    pool: DbPool,
}

impl DieselInquiryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load(
        &self,
        query: BoxedInquiryQuery<'_>,
        filter: &InquiryListFilter,
    ) -> Result<Vec<Inquiry>, InquiryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let query = match filter.status {
            Some(status) => query.filter(inquiries::status.eq(status.as_str())),
            None => query.filter(inquiries::status.ne(InquiryStatusKind::Deleted.as_str())),
        };
        let rows: Vec<InquiryRow> = query
            .select(InquiryRow::as_select())
            .order_by((inquiries::created_at.desc(), inquiries::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_inquiry).collect()
    }
}

fn row_to_inquiry(row: InquiryRow) -> Result<Inquiry, InquiryRepositoryError> {
    let id = row.id;
    Inquiry::try_from(row)
        .map_err(|reason| InquiryRepositoryError::query(format!("corrupt inquiry {id}: {reason}")))
}

#[async_trait]
impl InquiryRepository for DieselInquiryRepository {
    async fn create(&self, inquiry: &Inquiry) -> Result<(), InquiryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(inquiries::table)
            .values(&NewInquiryRow::from_domain(inquiry))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &InquiryId) -> Result<Option<Inquiry>, InquiryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<InquiryRow> = inquiries::table
            .filter(inquiries::id.eq(id.as_uuid()))
            .select(InquiryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_inquiry).transpose()
    }

    async fn list_for_buyer(
        &self,
        buyer_id: &PrincipalId,
        filter: &InquiryListFilter,
    ) -> Result<Vec<Inquiry>, InquiryRepositoryError> {
        let query = inquiries::table
            .filter(inquiries::buyer_id.eq(buyer_id.as_ref().to_owned()))
            .into_boxed();
        self.load(query, filter).await
    }

    async fn list_for_supplier(
        &self,
        supplier_id: &PrincipalId,
        filter: &InquiryListFilter,
    ) -> Result<Vec<Inquiry>, InquiryRepositoryError> {
        let query = inquiries::table
            .filter(inquiries::supplier_id.eq(supplier_id.as_ref().to_owned()))
            .into_boxed();
        self.load(query, filter).await
    }

    async fn list_all(
        &self,
        filter: &InquiryListFilter,
    ) -> Result<Vec<Inquiry>, InquiryRepositoryError> {
        self.load(inquiries::table.into_boxed(), filter).await
    }

    async fn count_by_status(
        &self,
        scope: &InquiryScope,
    ) -> Result<StatusCounts, InquiryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let grouped: Vec<(String, i64)> = match scope {
            InquiryScope::Buyer(id) => {
                inquiries::table
                    .filter(inquiries::buyer_id.eq(id.as_ref()))
                    .group_by(inquiries::status)
                    .select((inquiries::status, count_star()))
                    .load(&mut conn)
                    .await
            }
            InquiryScope::Supplier(id) => {
                inquiries::table
                    .filter(inquiries::supplier_id.eq(id.as_ref()))
                    .group_by(inquiries::status)
                    .select((inquiries::status, count_star()))
                    .load(&mut conn)
                    .await
            }
            InquiryScope::All => {
                inquiries::table
                    .group_by(inquiries::status)
                    .select((inquiries::status, count_star()))
                    .load(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;

        let mut counts = StatusCounts::default();
        for (status, count) in grouped {
            let kind: InquiryStatusKind = status
                .parse()
                .map_err(|reason: String| InquiryRepositoryError::query(reason))?;
            let count = u64::try_from(count).unwrap_or_default();
            match kind {
                InquiryStatusKind::Pending => counts.pending = count,
                InquiryStatusKind::Replied => counts.replied = count,
                InquiryStatusKind::Closed => counts.closed = count,
                InquiryStatusKind::Deleted => counts.deleted = count,
            }
        }
        Ok(counts)
    }

    async fn save(
        &self,
        inquiry: &Inquiry,
        expected_revision: u32,
    ) -> Result<(), InquiryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *inquiry.id().as_uuid();

        let updated_rows = diesel::update(inquiries::table)
            .filter(
                inquiries::id
                    .eq(id)
                    .and(inquiries::revision.eq(cast_revision_for_db(expected_revision))),
            )
            .set(&InquiryUpdate::from_domain(inquiry))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        match execute_optimistic_update(updated_rows) {
            UpdateResult::Success => Ok(()),
            UpdateResult::ZeroRows => {
                let current = inquiries::table
                    .filter(inquiries::id.eq(id))
                    .select(inquiries::revision)
                    .first::<i32>(&mut conn)
                    .await
                    .optional()
                    .map(|revision| revision.map(cast_revision))
                    .map_err(map_diesel_error);
                Err(disambiguate_update_failure(
                    current,
                    expected_revision,
                    &id.to_string(),
                ))
            }
        }
    }
}
