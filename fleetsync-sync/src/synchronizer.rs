//! Driver synchronizer: applies decoded deltas to the `drivers` collection.
//!
//! Every operation is safe to repeat: creation is guarded by an existence
//! query, and updates target every document matching the user, so a
//! duplicate left by a racing double-insert is kept in step rather than
//! treated as an error. Per-document writes are issued together and awaited
//! as one batch before an operation returns.

use std::sync::Arc;

use futures::future::try_join_all;

use fleetsync_core::{
    DocumentId, DriverDocument, DriverPatch, DriverProfile, DriverStatus, DriverStore, NewDriver,
    UserId,
};

use crate::delta::{DeltaCase, ProfileDiff, UserDelta};
use crate::error::SyncError;

/// Behaviour switches for [`DriverSynchronizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncOptions {
    /// When a user returns to the driver role and a document already exists,
    /// flip inactive matches back to active. Off by default: the existence
    /// check alone leaves the status untouched.
    pub reactivate_on_return: bool,
}

/// Result of [`DriverSynchronizer::ensure_created`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created(DocumentId),
    Existing { matches: usize, reactivated: usize },
}

/// Result of [`DriverSynchronizer::upsert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(DocumentId),
    Updated { matches: usize },
}

/// A mutation (or deliberate no-op) taken while applying a delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    Created { document: DocumentId },
    AlreadyPresent { matches: usize },
    Reactivated { records: usize },
    Deactivated { records: usize },
    ProfileSynced { records: usize },
}

pub struct DriverSynchronizer<S: ?Sized> {
    store: Arc<S>,
    options: SyncOptions,
}

impl<S: ?Sized> Clone for DriverSynchronizer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            options: self.options,
        }
    }
}

impl<S: DriverStore + ?Sized> DriverSynchronizer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_options(store, SyncOptions::default())
    }

    pub fn with_options(store: Arc<S>, options: SyncOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    /// Insert an active driver for `user_id` unless one already exists.
    ///
    /// Idempotent by existence, not by content: an existing document keeps
    /// its fields and status (see [`SyncOptions::reactivate_on_return`]).
    pub async fn ensure_created(
        &self,
        user_id: &UserId,
        profile: &DriverProfile,
    ) -> Result<EnsureOutcome, SyncError> {
        let existing = self.store.find_drivers(user_id).await?;
        if existing.is_empty() {
            let doc = self
                .store
                .insert_driver(NewDriver::active(user_id.clone(), profile.clone()))
                .await?;
            tracing::info!(user_id = %user_id, document = %doc.id, "driver record created");
            return Ok(EnsureOutcome::Created(doc.id));
        }

        let mut reactivated = 0;
        if self.options.reactivate_on_return {
            let inactive: Vec<_> = existing
                .iter()
                .filter(|doc| doc.record.status == DriverStatus::Inactive)
                .cloned()
                .collect();
            reactivated = self
                .update_all(&inactive, &DriverPatch::status(DriverStatus::Active))
                .await?;
            if reactivated > 0 {
                tracing::info!(user_id = %user_id, records = reactivated, "driver reactivated");
            }
        }

        tracing::debug!(user_id = %user_id, matches = existing.len(), "driver record already exists");
        Ok(EnsureOutcome::Existing {
            matches: existing.len(),
            reactivated,
        })
    }

    /// Mark every driver document for `user_id` inactive. Returns the number
    /// of documents written; zero when the user never had one.
    pub async fn deactivate(&self, user_id: &UserId) -> Result<usize, SyncError> {
        let docs = self.store.find_drivers(user_id).await?;
        let written = self
            .update_all(&docs, &DriverPatch::status(DriverStatus::Inactive))
            .await?;
        if written > 0 {
            tracing::info!(user_id = %user_id, records = written, "driver set inactive");
        }
        Ok(written)
    }

    /// Copy the changed profile fields onto every driver document for
    /// `user_id`. Performs no read and no write when nothing changed.
    pub async fn sync_profile(
        &self,
        user_id: &UserId,
        old: &DriverProfile,
        new: &DriverProfile,
    ) -> Result<usize, SyncError> {
        let diff = ProfileDiff::between(old, new);
        if diff.is_empty() {
            return Ok(0);
        }

        let patch = DriverPatch {
            driver_name: diff.name,
            driver_email: diff.email,
            driver_phone: diff.phone,
            ..DriverPatch::default()
        };
        let docs = self.store.find_drivers(user_id).await?;
        let written = self.update_all(&docs, &patch).await?;
        tracing::info!(user_id = %user_id, records = written, "driver details synced");
        Ok(written)
    }

    /// Create the driver if absent; otherwise overwrite the profile fields
    /// and force `active` on every match, whether or not anything differs.
    pub async fn upsert(
        &self,
        user_id: &UserId,
        profile: &DriverProfile,
    ) -> Result<UpsertOutcome, SyncError> {
        let existing = self.store.find_drivers(user_id).await?;
        if existing.is_empty() {
            let doc = self
                .store
                .insert_driver(NewDriver::active(user_id.clone(), profile.clone()))
                .await?;
            tracing::info!(user_id = %user_id, document = %doc.id, "driver record created");
            return Ok(UpsertOutcome::Created(doc.id));
        }

        let patch = DriverPatch::profile(profile).with_status(DriverStatus::Active);
        let matches = self.update_all(&existing, &patch).await?;
        tracing::debug!(user_id = %user_id, records = matches, "driver record overwritten");
        Ok(UpsertOutcome::Updated { matches })
    }

    /// Apply every case of `delta` in order, stopping at the first failure.
    pub async fn apply(
        &self,
        user_id: &UserId,
        delta: &UserDelta,
    ) -> Result<Vec<SyncAction>, SyncError> {
        let mut actions = Vec::new();
        for case in &delta.cases {
            match case {
                DeltaCase::CreatedAsDriver { profile }
                | DeltaCase::TransitionedToDriver { profile } => {
                    match self.ensure_created(user_id, profile).await? {
                        EnsureOutcome::Created(document) => {
                            actions.push(SyncAction::Created { document });
                        }
                        EnsureOutcome::Existing {
                            matches,
                            reactivated,
                        } => {
                            actions.push(SyncAction::AlreadyPresent { matches });
                            if reactivated > 0 {
                                actions.push(SyncAction::Reactivated {
                                    records: reactivated,
                                });
                            }
                        }
                    }
                }
                DeltaCase::TransitionedFromDriver => {
                    let records = self.deactivate(user_id).await?;
                    actions.push(SyncAction::Deactivated { records });
                }
                DeltaCase::ProfileUpdated { old, new } => {
                    let records = self.sync_profile(user_id, old, new).await?;
                    actions.push(SyncAction::ProfileSynced { records });
                }
            }
        }
        Ok(actions)
    }

    /// Write `patch` to every document in `docs`, awaiting all writes.
    pub(crate) async fn update_all(
        &self,
        docs: &[DriverDocument],
        patch: &DriverPatch,
    ) -> Result<usize, SyncError> {
        try_join_all(
            docs.iter()
                .map(|doc| self.store.update_driver(&doc.id, patch)),
        )
        .await?;
        Ok(docs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetsync_core::InMemoryStore;

    fn profile(name: &str, email: &str) -> DriverProfile {
        DriverProfile {
            name: name.to_string(),
            email: email.to_string(),
            phone: String::new(),
        }
    }

    fn setup() -> (Arc<InMemoryStore>, DriverSynchronizer<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let sync = DriverSynchronizer::new(Arc::clone(&store));
        (store, sync)
    }

    #[tokio::test]
    async fn ensure_created_inserts_once() {
        let (store, sync) = setup();
        let uid = UserId::from("u1");
        let ann = profile("Ann Lee", "a@x.com");

        let first = sync.ensure_created(&uid, &ann).await.unwrap();
        assert!(matches!(first, EnsureOutcome::Created(_)));
        let after_first = store.list_drivers().await.unwrap();

        let second = sync.ensure_created(&uid, &ann).await.unwrap();
        assert_eq!(
            second,
            EnsureOutcome::Existing {
                matches: 1,
                reactivated: 0
            }
        );
        assert_eq!(store.list_drivers().await.unwrap(), after_first);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn ensure_created_does_not_refresh_existing_content() {
        let (store, sync) = setup();
        let uid = UserId::from("u1");
        sync.ensure_created(&uid, &profile("Ann Lee", "a@x.com"))
            .await
            .unwrap();
        sync.ensure_created(&uid, &profile("Anne Lee", "anne@x.com"))
            .await
            .unwrap();

        let docs = store.find_drivers(&uid).await.unwrap();
        assert_eq!(docs[0].record.driver_name, "Ann Lee");
    }

    #[tokio::test]
    async fn deactivate_without_match_is_noop() {
        let (store, sync) = setup();
        assert_eq!(sync.deactivate(&UserId::from("ghost")).await.unwrap(), 0);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn sync_profile_equal_profiles_skips_store_entirely() {
        let (store, sync) = setup();
        let uid = UserId::from("u1");
        let ann = profile("Ann Lee", "a@x.com");
        sync.ensure_created(&uid, &ann).await.unwrap();
        let before = store.find_drivers(&uid).await.unwrap();

        store.fail_reads(true);
        assert_eq!(sync.sync_profile(&uid, &ann, &ann).await.unwrap(), 0);
        store.fail_reads(false);

        assert_eq!(store.find_drivers(&uid).await.unwrap(), before);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn upsert_overwrites_and_reactivates() {
        let (store, sync) = setup();
        let uid = UserId::from("u1");
        sync.ensure_created(&uid, &profile("Ann Lee", "a@x.com"))
            .await
            .unwrap();
        sync.deactivate(&uid).await.unwrap();

        let outcome = sync
            .upsert(&uid, &profile("Ann Lee", "a@x.com"))
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated { matches: 1 });
        let docs = store.find_drivers(&uid).await.unwrap();
        assert_eq!(docs[0].record.status, DriverStatus::Active);
        assert_eq!(store.write_count(), 3);
    }

    #[tokio::test]
    async fn reactivate_on_return_flips_inactive_records() {
        let store = Arc::new(InMemoryStore::new());
        let sync = DriverSynchronizer::with_options(
            Arc::clone(&store),
            SyncOptions {
                reactivate_on_return: true,
            },
        );
        let uid = UserId::from("u1");
        let ann = profile("Ann Lee", "a@x.com");
        sync.ensure_created(&uid, &ann).await.unwrap();
        sync.deactivate(&uid).await.unwrap();

        let outcome = sync.ensure_created(&uid, &ann).await.unwrap();
        assert_eq!(
            outcome,
            EnsureOutcome::Existing {
                matches: 1,
                reactivated: 1
            }
        );
        let docs = store.find_drivers(&uid).await.unwrap();
        assert_eq!(docs[0].record.status, DriverStatus::Active);
    }

    #[tokio::test]
    async fn write_failure_propagates_as_store_error() {
        let (store, sync) = setup();
        store.fail_writes(true);
        let err = sync
            .ensure_created(&UserId::from("u1"), &profile("Ann Lee", "a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Store(_)));
    }
}
