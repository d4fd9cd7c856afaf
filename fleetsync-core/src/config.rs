//! Optional `<home>/.fleetsync/config.yaml`.
//!
//! Every key has a default, so a missing file and an empty file mean the
//! same thing. Command-line flags override whatever is loaded here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::snapshot::{data_dir_at, home};

/// Engine tuning read from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Users reconciled at once during a full pass. `0` is treated as `1`.
    pub reconcile_concurrency: usize,
    /// Flip an existing inactive driver back to active when its user
    /// returns to the driver role.
    pub reactivate_on_return: bool,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            reconcile_concurrency: 1,
            reactivate_on_return: false,
        }
    }
}

/// `<home>/.fleetsync/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    data_dir_at(home).join("config.yaml")
}

/// Load the config under `home`, falling back to defaults when absent.
pub fn load_at(home: &Path) -> Result<FleetConfig, SnapshotError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(FleetConfig::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    if contents.trim().is_empty() {
        return Ok(FleetConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| SnapshotError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<FleetConfig, SnapshotError> {
    load_at(&home()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(home: &TempDir, body: &str) {
        let dir = data_dir_at(home.path());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.yaml"), body).unwrap();
    }

    #[test]
    fn missing_file_uses_defaults() {
        let home = TempDir::new().unwrap();
        assert_eq!(load_at(home.path()).unwrap(), FleetConfig::default());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let home = TempDir::new().unwrap();
        write_config(&home, "\n");
        assert_eq!(load_at(home.path()).unwrap(), FleetConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let home = TempDir::new().unwrap();
        write_config(&home, "reactivate_on_return: true\n");
        let config = load_at(home.path()).unwrap();
        assert!(config.reactivate_on_return);
        assert_eq!(config.reconcile_concurrency, 1);
    }

    #[test]
    fn malformed_file_reports_path() {
        let home = TempDir::new().unwrap();
        write_config(&home, "reconcile_concurrency: [not, a, number]\n");
        let err = load_at(home.path()).unwrap_err();
        assert!(matches!(err, SnapshotError::Parse { .. }));
        assert!(err.to_string().contains("config.yaml"));
    }
}
