//! Store Adapter contracts consumed by the sync engine.
//!
//! The engine never talks to a concrete database. It receives an adapter
//! implementing these traits at construction time; [`crate::memory`]
//! provides the in-process implementation used by tests and the CLI.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{DocumentId, DriverDocument, DriverPatch, NewDriver, UserId, UserRecord};

/// Read access to the primary `users` collection.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError>;

    /// Every user whose role equals `role`, compared case-insensitively,
    /// ordered by user id.
    async fn find_users_by_role(&self, role: &str)
        -> Result<Vec<(UserId, UserRecord)>, StoreError>;
}

/// Read/write access to the derived `drivers` collection.
///
/// Nothing here enforces one document per `driverId`; callers must
/// check before inserting and tolerate duplicates when updating.
#[async_trait]
pub trait DriverStore: Send + Sync {
    /// All documents whose `driverId` equals `driver_id`, in insertion order.
    async fn find_drivers(&self, driver_id: &UserId) -> Result<Vec<DriverDocument>, StoreError>;

    /// Insert a new document. The store assigns the id and stamps
    /// `createdAt` and `updatedAt` with the same server timestamp.
    async fn insert_driver(&self, driver: NewDriver) -> Result<DriverDocument, StoreError>;

    /// Apply `patch` to one document and refresh its `updatedAt`.
    async fn update_driver(&self, id: &DocumentId, patch: &DriverPatch) -> Result<(), StoreError>;

    /// Every driver document, in insertion order.
    async fn list_drivers(&self) -> Result<Vec<DriverDocument>, StoreError>;
}

/// Resolves capability claims attached to an authenticated caller.
#[async_trait]
pub trait ClaimResolver: Send + Sync {
    /// Whether `uid` carries the `admin` claim. Unknown users are not admins.
    async fn is_admin(&self, uid: &UserId) -> Result<bool, StoreError>;
}
