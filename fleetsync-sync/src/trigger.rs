//! Trigger boundary: the entrypoint a host calls on every user write.

use serde::{Deserialize, Serialize};

use fleetsync_core::{DriverStore, UserId, UserRecord};

use crate::delta::decode;
use crate::error::SyncError;
use crate::synchronizer::{DriverSynchronizer, SyncAction};

/// A before/after snapshot pair for one user document. Delivered
/// at-least-once; `None` means the document did not exist on that side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserChange {
    pub user_id: UserId,
    #[serde(default)]
    pub before: Option<UserRecord>,
    #[serde(default)]
    pub after: Option<UserRecord>,
}

/// Decode `change` and apply it. Failures are logged and returned so the
/// host reports the invocation failed and redelivers it.
pub async fn on_user_write<S>(
    sync: &DriverSynchronizer<S>,
    change: &UserChange,
) -> Result<Vec<SyncAction>, SyncError>
where
    S: DriverStore + ?Sized,
{
    let delta = decode(change.before.as_ref(), change.after.as_ref());
    if delta.is_empty() {
        tracing::debug!(user_id = %change.user_id, "user write needs no driver sync");
        return Ok(Vec::new());
    }

    sync.apply(&change.user_id, &delta).await.map_err(|err| {
        tracing::error!(user_id = %change.user_id, error = %err, "error syncing drivers");
        err
    })
}
