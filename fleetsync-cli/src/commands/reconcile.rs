//! `fleetsync reconcile`: the `reconcileAll` callable.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::context::{caller, Workspace};

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Caller identity; must hold the `admin` claim.
    #[arg(long = "as", value_name = "UID")]
    pub as_uid: Option<String>,

    /// Users processed at once. Overrides `reconcile_concurrency`.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ReconcileArgs {
    pub async fn run(self, workspace: &Workspace) -> Result<()> {
        let outcome = workspace
            .callables(self.concurrency)
            .reconcile_all(&caller(self.as_uid))
            .await;
        // A failed pass may still have written earlier users.
        workspace.commit().await?;
        let response = outcome.context("reconcileAll failed")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Ok(());
        }
        println!(
            "{} {}: {} created, {} updated, {} total",
            "✓".green(),
            response.message,
            response.created.unwrap_or_default(),
            response.updated.unwrap_or_default(),
            response.total.unwrap_or_default(),
        );
        Ok(())
    }
}
