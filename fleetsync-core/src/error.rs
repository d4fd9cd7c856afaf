//! Error types for fleetsync-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::DocumentId;

/// Failure of an underlying document store read or write.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// An update targeted a document that no longer exists.
    #[error("document {id} not found")]
    DocumentNotFound { id: DocumentId },
}

/// All errors that can arise while loading or saving store snapshots and
/// configuration files.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Underlying I/O failure (permission denied, disk full, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or pass --home")]
    HomeNotFound,
}
