//! Per-invocation workspace: config plus the store snapshot, loaded from
//! `<home>/.fleetsync/` and written back after a mutating command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use fleetsync_core::{config, snapshot, FleetConfig, InMemoryStore, UserId};
use fleetsync_sync::{
    Callables, CallerContext, DriverSynchronizer, ReconcileOptions, Reconciler, SyncOptions,
};

pub type LocalCallables = Callables<InMemoryStore, InMemoryStore, InMemoryStore>;

pub struct Workspace {
    home: PathBuf,
    pub config: FleetConfig,
    pub store: Arc<InMemoryStore>,
}

impl Workspace {
    pub fn open(home: Option<PathBuf>) -> Result<Self> {
        let home = match home {
            Some(home) => home,
            None => dirs::home_dir().context("could not determine home directory")?,
        };
        let config = config::load_at(&home).context("failed to load config.yaml")?;
        let snapshot = snapshot::load_at(&home).context("failed to load store.yaml")?;
        tracing::debug!(home = %home.display(), "workspace opened");
        Ok(Self {
            home,
            config,
            store: Arc::new(InMemoryStore::from_snapshot(snapshot)),
        })
    }

    pub fn synchronizer(&self) -> DriverSynchronizer<InMemoryStore> {
        DriverSynchronizer::with_options(
            Arc::clone(&self.store),
            SyncOptions {
                reactivate_on_return: self.config.reactivate_on_return,
            },
        )
    }

    /// Callable handlers. `concurrency` overrides `reconcile_concurrency`.
    pub fn callables(&self, concurrency: Option<usize>) -> LocalCallables {
        let options = ReconcileOptions {
            concurrency: concurrency.unwrap_or(self.config.reconcile_concurrency),
        };
        let reconciler =
            Reconciler::new(Arc::clone(&self.store), self.synchronizer()).with_options(options);
        Callables::new(reconciler, Arc::clone(&self.store))
    }

    /// Persist the current store contents.
    pub async fn commit(&self) -> Result<()> {
        let snapshot = self.store.snapshot().await;
        snapshot::save_at(&self.home, &snapshot).context("failed to save store.yaml")
    }
}

/// Build the caller identity from an optional `--as` flag.
pub fn caller(uid: Option<String>) -> CallerContext {
    match uid {
        Some(uid) => CallerContext::authenticated(UserId::from(uid)),
        None => CallerContext::anonymous(),
    }
}
