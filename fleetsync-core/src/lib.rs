//! fleetsync core library: domain types, store contracts, persistence.
//!
//! - [`types`]: newtypes and user/driver documents
//! - [`store`]: Store Adapter and claim resolver traits
//! - [`memory`]: in-process adapter
//! - [`snapshot`] / [`config`]: YAML files under `~/.fleetsync/`
//! - [`error`]: [`StoreError`], [`SnapshotError`]

pub mod config;
pub mod error;
pub mod memory;
pub mod snapshot;
pub mod store;
pub mod types;

pub use config::FleetConfig;
pub use error::{SnapshotError, StoreError};
pub use memory::InMemoryStore;
pub use snapshot::StoreSnapshot;
pub use store::{ClaimResolver, DriverStore, UserStore};
pub use types::{
    DocumentId, DriverDocument, DriverPatch, DriverProfile, DriverRecord, DriverStatus, NewDriver,
    UserId, UserRecord,
};
