//! # fleetsync-sync
//!
//! Keeps the derived `drivers` collection in step with `users`.
//!
//! Call [`trigger::on_user_write`] from the host on every user write, and
//! expose [`callable::Callables`] for operator assignment and full
//! reconciliation.

pub mod assignment;
pub mod callable;
pub mod delta;
pub mod error;
pub mod reconciler;
pub mod synchronizer;
pub mod trigger;

pub use callable::{AssignDriverRequest, CallableResponse, Callables, CallerContext};
pub use delta::{decode, DeltaCase, ProfileDiff, UserDelta};
pub use error::SyncError;
pub use reconciler::{ReconcileOptions, ReconcileReport, Reconciler};
pub use synchronizer::{DriverSynchronizer, EnsureOutcome, SyncAction, SyncOptions, UpsertOutcome};
pub use trigger::{on_user_write, UserChange};
