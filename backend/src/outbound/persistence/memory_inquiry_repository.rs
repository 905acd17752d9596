//! In-process `InquiryRepository` used when no database is configured.
//!
//! A single mutex guards the inquiry map and the buyer/supplier indexes, so
//! the revision check and the write in `save` happen atomically.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{InquiryRepository, InquiryRepositoryError, InquiryScope};
use crate::domain::{Inquiry, InquiryId, InquiryListFilter, PrincipalId, StatusCounts};

#[derive(Default)]
struct Store {
    inquiries: HashMap<InquiryId, Inquiry>,
    by_buyer: HashMap<PrincipalId, BTreeSet<InquiryId>>,
    by_supplier: HashMap<PrincipalId, BTreeSet<InquiryId>>,
}

impl Store {
    fn collect<'a>(
        &self,
        ids: impl Iterator<Item = &'a InquiryId>,
        filter: &InquiryListFilter,
    ) -> Vec<Inquiry> {
        let mut found: Vec<Inquiry> = ids
            .filter_map(|id| self.inquiries.get(id))
            .filter(|inquiry| filter.matches(inquiry.status()))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        found
    }

    fn indexed(
        &self,
        index: &HashMap<PrincipalId, BTreeSet<InquiryId>>,
        owner: &PrincipalId,
        filter: &InquiryListFilter,
    ) -> Vec<Inquiry> {
        match index.get(owner) {
            Some(ids) => self.collect(ids.iter(), filter),
            None => Vec::new(),
        }
    }
}

/// Mutex-guarded in-memory inquiry store.
#[derive(Default)]
pub struct InMemoryInquiryRepository {
    store: Mutex<Store>,
}

impl InMemoryInquiryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, InquiryRepositoryError> {
        self.store
            .lock()
            .map_err(|_| InquiryRepositoryError::connection("inquiry store lock poisoned"))
    }
}

#[async_trait]
impl InquiryRepository for InMemoryInquiryRepository {
    async fn create(&self, inquiry: &Inquiry) -> Result<(), InquiryRepositoryError> {
        let mut store = self.lock()?;
        let id = inquiry.id();
        if store.inquiries.contains_key(&id) {
            return Err(InquiryRepositoryError::duplicate(id.to_string()));
        }
        store
            .by_buyer
            .entry(inquiry.buyer_id().clone())
            .or_default()
            .insert(id);
        store
            .by_supplier
            .entry(inquiry.supplier_id().clone())
            .or_default()
            .insert(id);
        store.inquiries.insert(id, inquiry.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &InquiryId) -> Result<Option<Inquiry>, InquiryRepositoryError> {
        Ok(self.lock()?.inquiries.get(id).cloned())
    }

    async fn list_for_buyer(
        &self,
        buyer_id: &PrincipalId,
        filter: &InquiryListFilter,
    ) -> Result<Vec<Inquiry>, InquiryRepositoryError> {
        let store = self.lock()?;
        Ok(store.indexed(&store.by_buyer, buyer_id, filter))
    }

    async fn list_for_supplier(
        &self,
        supplier_id: &PrincipalId,
        filter: &InquiryListFilter,
    ) -> Result<Vec<Inquiry>, InquiryRepositoryError> {
        let store = self.lock()?;
        Ok(store.indexed(&store.by_supplier, supplier_id, filter))
    }

    async fn list_all(
        &self,
        filter: &InquiryListFilter,
    ) -> Result<Vec<Inquiry>, InquiryRepositoryError> {
        let store = self.lock()?;
        Ok(store.collect(store.inquiries.keys(), filter))
    }

    async fn count_by_status(
        &self,
        scope: &InquiryScope,
    ) -> Result<StatusCounts, InquiryRepositoryError> {
        let store = self.lock()?;
        let mut counts = StatusCounts::default();
        store
            .inquiries
            .values()
            .filter(|inquiry| scope.contains(inquiry))
            .for_each(|inquiry| counts.record(inquiry.status().kind()));
        Ok(counts)
    }

    async fn save(
        &self,
        inquiry: &Inquiry,
        expected_revision: u32,
    ) -> Result<(), InquiryRepositoryError> {
        let mut store = self.lock()?;
        let id = inquiry.id();
        let Some(current) = store.inquiries.get_mut(&id) else {
            return Err(InquiryRepositoryError::missing(id.to_string()));
        };
        if current.revision() != expected_revision {
            return Err(InquiryRepositoryError::revision_mismatch(
                expected_revision,
                current.revision(),
            ));
        }
        *current = inquiry.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InquiryStatusKind;
    use crate::test_support::{fixture_timestamp, pending_inquiry, pending_inquiry_at, principal_id};
    use chrono::TimeDelta;
    use rstest::{fixture, rstest};

    #[fixture]
    fn repo() -> InMemoryInquiryRepository {
        InMemoryInquiryRepository::new()
    }

    #[rstest]
    #[tokio::test]
    async fn create_then_find(repo: InMemoryInquiryRepository) {
        let inquiry = pending_inquiry("7", "11");
        repo.create(&inquiry).await.expect("create");

        let found = repo.find_by_id(&inquiry.id()).await.expect("find");
        assert_eq!(found, Some(inquiry));
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_duplicate_ids(repo: InMemoryInquiryRepository) {
        let inquiry = pending_inquiry("7", "11");
        repo.create(&inquiry).await.expect("create");

        let err = repo.create(&inquiry).await.expect_err("duplicate");
        assert!(matches!(err, InquiryRepositoryError::Duplicate { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn save_checks_revision(repo: InMemoryInquiryRepository) {
        let inquiry = pending_inquiry("7", "11");
        repo.create(&inquiry).await.expect("create");
        let replied = inquiry
            .supplier_reply_with(crate::test_support::body("yes"), fixture_timestamp())
            .expect("reply");

        repo.save(&replied, 1).await.expect("first save");
        let err = repo.save(&replied, 1).await.expect_err("stale save");

        assert_eq!(err, InquiryRepositoryError::revision_mismatch(1_u32, 2_u32));
        let stored = repo.find_by_id(&inquiry.id()).await.expect("find");
        assert_eq!(stored.map(|i| i.revision()), Some(2));
    }

    #[rstest]
    #[tokio::test]
    async fn save_unknown_inquiry_is_missing(repo: InMemoryInquiryRepository) {
        let err = repo
            .save(&pending_inquiry("7", "11"), 1)
            .await
            .expect_err("missing");
        assert!(matches!(err, InquiryRepositoryError::Missing { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn listings_are_newest_first_and_hide_deleted(repo: InMemoryInquiryRepository) {
        let base = fixture_timestamp();
        let oldest = pending_inquiry_at("7", "11", base);
        let newest = pending_inquiry_at("7", "11", base + TimeDelta::hours(2));
        let deleted = pending_inquiry_at("7", "11", base + TimeDelta::hours(1));
        let other_buyer = pending_inquiry_at("8", "11", base + TimeDelta::hours(3));
        for inquiry in [&oldest, &newest, &deleted, &other_buyer] {
            repo.create(inquiry).await.expect("create");
        }
        let removed = deleted.soft_delete(base).expect("deletable");
        repo.save(&removed, 1).await.expect("save");

        let buyer = principal_id("7");
        let listed = repo
            .list_for_buyer(&buyer, &InquiryListFilter::default())
            .await
            .expect("list");
        let ids: Vec<_> = listed.iter().map(Inquiry::id).collect();
        assert_eq!(ids, vec![newest.id(), oldest.id()]);

        let recoverable = repo
            .list_for_supplier(
                &principal_id("11"),
                &InquiryListFilter::with_status(InquiryStatusKind::Deleted),
            )
            .await
            .expect("list");
        assert_eq!(recoverable.len(), 1);
        assert_eq!(recoverable[0].id(), deleted.id());

        let all = repo
            .list_all(&InquiryListFilter::default())
            .await
            .expect("list");
        assert_eq!(all.first().map(Inquiry::id), Some(other_buyer.id()));
        assert_eq!(all.len(), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn equal_timestamps_break_ties_by_id(repo: InMemoryInquiryRepository) {
        let a = pending_inquiry("7", "11");
        let b = pending_inquiry("7", "11");
        repo.create(&a).await.expect("create");
        repo.create(&b).await.expect("create");

        let listed = repo
            .list_all(&InquiryListFilter::default())
            .await
            .expect("list");

        let mut expected = vec![a.id(), b.id()];
        expected.sort();
        expected.reverse();
        assert_eq!(listed.iter().map(Inquiry::id).collect::<Vec<_>>(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn counts_are_scoped(repo: InMemoryInquiryRepository) {
        repo.create(&pending_inquiry("7", "11")).await.expect("create");
        repo.create(&pending_inquiry("8", "11")).await.expect("create");
        repo.create(&pending_inquiry("7", "12")).await.expect("create");

        let buyer = repo
            .count_by_status(&InquiryScope::Buyer(principal_id("7")))
            .await
            .expect("count");
        let supplier = repo
            .count_by_status(&InquiryScope::Supplier(principal_id("11")))
            .await
            .expect("count");
        let all = repo.count_by_status(&InquiryScope::All).await.expect("count");

        assert_eq!(buyer.pending, 2);
        assert_eq!(supplier.pending, 2);
        assert_eq!(all.open_total(), 3);
    }
}
