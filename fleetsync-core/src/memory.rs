//! In-process Store Adapter.
//!
//! Holds both collections and the admin claim set behind a single
//! `tokio::sync::RwLock`. Server timestamps are strictly increasing within
//! one store, so two writes never share an `updatedAt`.
//!
//! Besides the adapter traits it offers host-side operations (putting and
//! removing users, granting claims) that the engine itself never calls, plus
//! write counting and failure injection for tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::snapshot::{StoreSnapshot, SNAPSHOT_VERSION};
use crate::store::{ClaimResolver, DriverStore, UserStore};
use crate::types::{
    is_driver_role, DocumentId, DriverDocument, DriverPatch, DriverRecord, NewDriver, UserId,
    UserRecord,
};

#[derive(Debug, Default)]
struct StoreState {
    users: BTreeMap<UserId, UserRecord>,
    drivers: Vec<DriverDocument>,
    admins: BTreeSet<UserId>,
    next_document: u64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl StoreState {
    fn server_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(stamp);
        stamp
    }

    fn next_document_id(&mut self) -> DocumentId {
        self.next_document += 1;
        DocumentId(format!("drv_{:06}", self.next_document))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
    writes: AtomicU64,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a persisted snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let last_timestamp = snapshot
            .drivers
            .iter()
            .map(|doc| doc.record.updated_at)
            .max();
        Self {
            state: RwLock::new(StoreState {
                users: snapshot.users,
                drivers: snapshot.drivers,
                admins: snapshot.admins,
                next_document: snapshot.next_document,
                last_timestamp,
            }),
            ..Self::default()
        }
    }

    /// Capture the current contents for persistence.
    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read().await;
        StoreSnapshot {
            version: SNAPSHOT_VERSION,
            users: state.users.clone(),
            drivers: state.drivers.clone(),
            admins: state.admins.clone(),
            next_document: state.next_document,
        }
    }

    // -- host-side user collection ------------------------------------------

    /// Write `record` as the full contents of user `id`, returning the
    /// previous contents (the "before" half of a change event).
    pub async fn put_user(&self, id: UserId, record: UserRecord) -> Option<UserRecord> {
        self.state.write().await.users.insert(id, record)
    }

    /// Delete user `id`, returning what was there.
    pub async fn remove_user(&self, id: &UserId) -> Option<UserRecord> {
        self.state.write().await.users.remove(id)
    }

    pub async fn users(&self) -> Vec<(UserId, UserRecord)> {
        let state = self.state.read().await;
        state
            .users
            .iter()
            .map(|(id, user)| (id.clone(), user.clone()))
            .collect()
    }

    // -- host-side claims ---------------------------------------------------

    /// Grant the `admin` claim. Returns `false` if it was already set.
    pub async fn grant_admin(&self, uid: UserId) -> bool {
        self.state.write().await.admins.insert(uid)
    }

    /// Revoke the `admin` claim. Returns `false` if it was not set.
    pub async fn revoke_admin(&self, uid: &UserId) -> bool {
        self.state.write().await.admins.remove(uid)
    }

    // -- test hooks ---------------------------------------------------------

    /// Number of successful driver inserts and updates so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent read fail with [`StoreError::Unavailable`].
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent driver write fail with [`StoreError::Unavailable`].
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Insert a driver document verbatim, bypassing any existence check.
    /// Used to simulate the duplicate a racing double-insert would leave.
    pub async fn insert_raw_driver(&self, driver: NewDriver) -> DriverDocument {
        let mut state = self.state.write().await;
        insert_into(&mut state, driver)
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }
}

fn insert_into(state: &mut StoreState, driver: NewDriver) -> DriverDocument {
    let id = state.next_document_id();
    let stamp = state.server_timestamp();
    let doc = DriverDocument {
        id,
        record: DriverRecord {
            driver_id: driver.driver_id,
            driver_name: driver.profile.name,
            driver_email: driver.profile.email,
            driver_phone: driver.profile.phone,
            assigned_bus_number: driver.assigned_bus_number,
            assigned_route: driver.assigned_route,
            status: driver.status,
            created_at: stamp,
            updated_at: stamp,
        },
    };
    state.drivers.push(doc.clone());
    doc
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        self.check_read()?;
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn find_users_by_role(
        &self,
        role: &str,
    ) -> Result<Vec<(UserId, UserRecord)>, StoreError> {
        self.check_read()?;
        let state = self.state.read().await;
        let matches_role = |user: &UserRecord| {
            let actual = user.role.as_deref().unwrap_or_default();
            if is_driver_role(role) {
                is_driver_role(actual)
            } else {
                actual.eq_ignore_ascii_case(role)
            }
        };
        Ok(state
            .users
            .iter()
            .filter(|(_, user)| matches_role(user))
            .map(|(id, user)| (id.clone(), user.clone()))
            .collect())
    }
}

#[async_trait]
impl DriverStore for InMemoryStore {
    async fn find_drivers(&self, driver_id: &UserId) -> Result<Vec<DriverDocument>, StoreError> {
        self.check_read()?;
        let state = self.state.read().await;
        Ok(state
            .drivers
            .iter()
            .filter(|doc| doc.record.driver_id == *driver_id)
            .cloned()
            .collect())
    }

    async fn insert_driver(&self, driver: NewDriver) -> Result<DriverDocument, StoreError> {
        self.check_write()?;
        let mut state = self.state.write().await;
        let doc = insert_into(&mut state, driver);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(doc)
    }

    async fn update_driver(&self, id: &DocumentId, patch: &DriverPatch) -> Result<(), StoreError> {
        self.check_write()?;
        let mut state = self.state.write().await;
        let stamp = state.server_timestamp();
        let Some(doc) = state.drivers.iter_mut().find(|doc| doc.id == *id) else {
            return Err(StoreError::DocumentNotFound { id: id.clone() });
        };
        patch.apply_to(&mut doc.record);
        doc.record.updated_at = stamp;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_drivers(&self) -> Result<Vec<DriverDocument>, StoreError> {
        self.check_read()?;
        Ok(self.state.read().await.drivers.clone())
    }
}

#[async_trait]
impl ClaimResolver for InMemoryStore {
    async fn is_admin(&self, uid: &UserId) -> Result<bool, StoreError> {
        self.check_read()?;
        Ok(self.state.read().await.admins.contains(uid))
    }
}
