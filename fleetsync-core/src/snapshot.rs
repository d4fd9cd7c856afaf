//! YAML persistence for the in-memory store.
//!
//! # Storage layout
//!
//! ```text
//! ~/.fleetsync/              (mode 0700)
//!   store.yaml               (users, drivers, admin claims, mode 0600)
//!   config.yaml              (optional, see crate::config)
//! ```
//!
//! # API pattern
//!
//! Every function has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::types::{DriverDocument, UserId, UserRecord};

/// Current on-disk format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted contents of an [`crate::memory::InMemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    #[serde(default)]
    pub users: BTreeMap<UserId, UserRecord>,
    #[serde(default)]
    pub drivers: Vec<DriverDocument>,
    #[serde(default)]
    pub admins: BTreeSet<UserId>,
    /// Last driver document number handed out.
    #[serde(default)]
    pub next_document: u64,
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            users: BTreeMap::new(),
            drivers: Vec::new(),
            admins: BTreeSet::new(),
            next_document: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.fleetsync/`: pure, no I/O.
pub fn data_dir_at(home: &Path) -> PathBuf {
    home.join(".fleetsync")
}

/// `<home>/.fleetsync/store.yaml`: pure, no I/O.
pub fn snapshot_path_at(home: &Path) -> PathBuf {
    data_dir_at(home).join("store.yaml")
}

/// Create `<home>/.fleetsync/` (mode `0700`) if it does not yet exist.
pub fn ensure_data_dir_at(home: &Path) -> Result<PathBuf, SnapshotError> {
    let dir = data_dir_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    Ok(dir)
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load the snapshot under `home`.
///
/// A missing file is an empty store, not an error. Malformed YAML returns
/// `SnapshotError::Parse` with the file path.
pub fn load_at(home: &Path) -> Result<StoreSnapshot, SnapshotError> {
    let path = snapshot_path_at(home);
    if !path.exists() {
        return Ok(StoreSnapshot::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| SnapshotError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<StoreSnapshot, SnapshotError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `snapshot` to `<home>/.fleetsync/store.yaml`.
///
/// Write flow: serialize → `store.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, snapshot: &StoreSnapshot) -> Result<(), SnapshotError> {
    ensure_data_dir_at(home)?;
    let path = snapshot_path_at(home);
    let tmp_path = path.with_file_name("store.yaml.tmp");

    let yaml = serde_yaml::to_string(snapshot)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    tracing::debug!(path = %path.display(), drivers = snapshot.drivers.len(), "snapshot saved");
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(snapshot: &StoreSnapshot) -> Result<(), SnapshotError> {
    save_at(&home()?, snapshot)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

pub(crate) fn home() -> Result<PathBuf, SnapshotError> {
    dirs::home_dir().ok_or(SnapshotError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), SnapshotError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), SnapshotError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), SnapshotError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), SnapshotError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
