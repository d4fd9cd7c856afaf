//! Error types for fleetsync-sync.

use thiserror::Error;

use fleetsync_core::StoreError;

/// All errors that can arise from sync, assignment, and reconciliation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The caller carried no identity.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The caller is known but lacks the `admin` claim.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A referenced driver document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A required input was missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Underlying store read/write failure, passed through unchanged.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Wire code reported to callable clients.
    pub fn code(&self) -> &'static str {
        match self {
            SyncError::Unauthenticated(_) => "unauthenticated",
            SyncError::PermissionDenied(_) => "permission-denied",
            SyncError::NotFound(_) => "not-found",
            SyncError::InvalidArgument(_) => "invalid-argument",
            SyncError::Store(_) => "internal",
        }
    }
}
