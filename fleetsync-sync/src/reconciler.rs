//! Full-collection reconciliation.
//!
//! Rebuilds the `drivers` collection from every user currently holding the
//! driver role. Unlike incremental sync it always writes, so drift left by
//! missed or failed change events converges in one pass. Records are not
//! processed atomically as a group: a failure leaves earlier users synced
//! and a re-run is safe.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;

use fleetsync_core::types::DRIVER_ROLE;
use fleetsync_core::{DriverStore, UserStore};

use crate::error::SyncError;
use crate::synchronizer::{DriverSynchronizer, UpsertOutcome};

/// Tuning for a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Users processed at once. `0` behaves as `1`.
    pub concurrency: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// Aggregate counts of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReconcileReport {
    pub created: usize,
    pub updated: usize,
    /// Driver-role users scanned.
    pub total: usize,
}

pub struct Reconciler<U: ?Sized, D: ?Sized> {
    users: Arc<U>,
    sync: DriverSynchronizer<D>,
    options: ReconcileOptions,
}

impl<U, D> Reconciler<U, D>
where
    U: UserStore + ?Sized,
    D: DriverStore + ?Sized,
{
    pub fn new(users: Arc<U>, sync: DriverSynchronizer<D>) -> Self {
        Self {
            users,
            sync,
            options: ReconcileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn synchronizer(&self) -> &DriverSynchronizer<D> {
        &self.sync
    }

    /// Run a full pass. Refuses non-admin actors before touching the store.
    pub async fn reconcile_all(&self, actor_is_admin: bool) -> Result<ReconcileReport, SyncError> {
        if !actor_is_admin {
            return Err(SyncError::PermissionDenied(
                "Only admins can sync drivers".to_string(),
            ));
        }

        let users = self.users.find_users_by_role(DRIVER_ROLE).await?;
        let total = users.len();
        tracing::info!(users = total, "starting full driver sync");

        let sync = &self.sync;
        let outcomes: Vec<UpsertOutcome> = stream::iter(users)
            .map(|(user_id, user)| async move { sync.upsert(&user_id, &user.profile()).await })
            .buffer_unordered(self.options.concurrency.max(1))
            .try_collect()
            .await?;

        let created = outcomes
            .iter()
            .filter(|o| matches!(o, UpsertOutcome::Created(_)))
            .count();
        let report = ReconcileReport {
            created,
            updated: outcomes.len() - created,
            total,
        };
        tracing::info!(
            created = report.created,
            updated = report.updated,
            total = report.total,
            "full driver sync complete"
        );
        Ok(report)
    }
}
