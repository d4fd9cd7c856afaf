//! Callable boundary: authenticated request handlers for `assignDriver`
//! and `reconcileAll`.
//!
//! Caller identity arrives already established by the host; this layer
//! only checks that it is present and, for reconciliation, resolves the
//! `admin` claim.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use fleetsync_core::{ClaimResolver, DriverStore, UserId, UserStore};

use crate::error::SyncError;
use crate::reconciler::{ReconcileReport, Reconciler};

/// Identity attached to a callable request by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallerContext {
    pub uid: Option<UserId>,
}

impl CallerContext {
    pub fn anonymous() -> Self {
        Self { uid: None }
    }

    pub fn authenticated(uid: impl Into<UserId>) -> Self {
        Self {
            uid: Some(uid.into()),
        }
    }

    fn require_uid(&self) -> Result<&UserId, SyncError> {
        self.uid.as_ref().ok_or_else(|| {
            SyncError::Unauthenticated("User must be authenticated".to_string())
        })
    }
}

/// `assignDriver` payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignDriverRequest {
    pub driver_id: Option<String>,
    pub assigned_bus_number: Option<String>,
    pub assigned_route: Option<String>,
}

/// Success payload shared by both callables. Count fields are only present
/// on reconciliation responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallableResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl CallableResponse {
    fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            created: None,
            updated: None,
            total: None,
        }
    }

    fn reconciled(report: ReconcileReport) -> Self {
        Self {
            created: Some(report.created),
            updated: Some(report.updated),
            total: Some(report.total),
            ..Self::ok("Driver sync completed")
        }
    }
}

pub struct Callables<U: ?Sized, D: ?Sized, C: ?Sized> {
    reconciler: Reconciler<U, D>,
    claims: Arc<C>,
}

impl<U, D, C> Callables<U, D, C>
where
    U: UserStore + ?Sized,
    D: DriverStore + ?Sized,
    C: ClaimResolver + ?Sized,
{
    pub fn new(reconciler: Reconciler<U, D>, claims: Arc<C>) -> Self {
        Self { reconciler, claims }
    }

    /// Handle an `assignDriver` call.
    pub async fn assign_driver(
        &self,
        ctx: &CallerContext,
        request: &AssignDriverRequest,
    ) -> Result<CallableResponse, SyncError> {
        self.assign_driver_inner(ctx, request).await.map_err(|err| {
            tracing::error!(code = err.code(), error = %err, "error updating driver");
            err
        })
    }

    async fn assign_driver_inner(
        &self,
        ctx: &CallerContext,
        request: &AssignDriverRequest,
    ) -> Result<CallableResponse, SyncError> {
        ctx.require_uid()?;
        let driver_id = UserId::from(request.driver_id.clone().unwrap_or_default());
        self.reconciler
            .synchronizer()
            .assign(
                &driver_id,
                request.assigned_bus_number.as_deref(),
                request.assigned_route.as_deref(),
            )
            .await?;
        Ok(CallableResponse::ok("Driver assignment updated"))
    }

    /// Handle a `reconcileAll` call; requires the `admin` claim.
    pub async fn reconcile_all(&self, ctx: &CallerContext) -> Result<CallableResponse, SyncError> {
        self.reconcile_all_inner(ctx).await.map_err(|err| {
            tracing::error!(code = err.code(), error = %err, "error syncing drivers");
            err
        })
    }

    async fn reconcile_all_inner(&self, ctx: &CallerContext) -> Result<CallableResponse, SyncError> {
        let uid = ctx.require_uid()?;
        let is_admin = self.claims.is_admin(uid).await?;
        let report = self.reconciler.reconcile_all(is_admin).await?;
        Ok(CallableResponse::reconciled(report))
    }
}
