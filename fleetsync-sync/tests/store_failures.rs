//! Partial-failure behavior against a store that starts failing after a
//! fixed number of inserts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use fleetsync_core::{
    DocumentId, DriverDocument, DriverPatch, DriverStore, InMemoryStore, NewDriver, StoreError,
    UserId, UserRecord, UserStore,
};
use fleetsync_sync::{DriverSynchronizer, Reconciler, SyncError};

/// Delegates to an [`InMemoryStore`] but rejects inserts once `budget`
/// successful ones have gone through.
struct FlakyStore {
    inner: InMemoryStore,
    budget: AtomicUsize,
}

impl FlakyStore {
    fn new(budget: usize) -> Self {
        Self {
            inner: InMemoryStore::new(),
            budget: AtomicUsize::new(budget),
        }
    }

    fn refill(&self, budget: usize) {
        self.budget.store(budget, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStore for FlakyStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        self.inner.get_user(id).await
    }

    async fn find_users_by_role(
        &self,
        role: &str,
    ) -> Result<Vec<(UserId, UserRecord)>, StoreError> {
        self.inner.find_users_by_role(role).await
    }
}

#[async_trait]
impl DriverStore for FlakyStore {
    async fn find_drivers(&self, driver_id: &UserId) -> Result<Vec<DriverDocument>, StoreError> {
        self.inner.find_drivers(driver_id).await
    }

    async fn insert_driver(&self, driver: NewDriver) -> Result<DriverDocument, StoreError> {
        let granted = self
            .budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if !granted {
            return Err(StoreError::Unavailable("insert quota exhausted".to_string()));
        }
        self.inner.insert_driver(driver).await
    }

    async fn update_driver(&self, id: &DocumentId, patch: &DriverPatch) -> Result<(), StoreError> {
        self.inner.update_driver(id, patch).await
    }

    async fn list_drivers(&self) -> Result<Vec<DriverDocument>, StoreError> {
        self.inner.list_drivers().await
    }
}

fn driver(first: &str) -> UserRecord {
    UserRecord {
        role: Some("driver".to_string()),
        first_name: Some(first.to_string()),
        ..UserRecord::default()
    }
}

async fn seeded(budget: usize) -> Arc<FlakyStore> {
    let store = Arc::new(FlakyStore::new(budget));
    for (id, name) in [("a", "Ann"), ("b", "Bob"), ("c", "Cat")] {
        store.inner.put_user(UserId::from(id), driver(name)).await;
    }
    store
}

#[tokio::test]
async fn failed_pass_keeps_earlier_records_and_rerun_converges() {
    let store = seeded(2).await;
    let reconciler = Reconciler::new(
        Arc::clone(&store),
        DriverSynchronizer::new(Arc::clone(&store)),
    );

    let err = reconciler.reconcile_all(true).await.unwrap_err();
    assert!(matches!(err, SyncError::Store(StoreError::Unavailable(_))));
    assert_eq!(err.code(), "internal");
    // Sequential pass in user-id order: a and b landed, c did not.
    let partial = store.list_drivers().await.unwrap();
    let ids: Vec<_> = partial
        .iter()
        .map(|d| d.record.driver_id.as_str().to_string())
        .collect();
    assert_eq!(ids, ["a", "b"]);

    store.refill(usize::MAX);
    let report = reconciler.reconcile_all(true).await.unwrap();
    assert_eq!((report.created, report.updated, report.total), (1, 2, 3));
    assert_eq!(store.list_drivers().await.unwrap().len(), 3);
}

#[tokio::test]
async fn ensure_created_surfaces_insert_failure() {
    let store = Arc::new(FlakyStore::new(0));
    let sync = DriverSynchronizer::new(Arc::clone(&store));

    let err = sync
        .ensure_created(&UserId::from("a"), &driver("Ann").profile())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Store(_)));
    assert!(store.list_drivers().await.unwrap().is_empty());
}
