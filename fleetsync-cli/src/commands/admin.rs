//! `fleetsync admin`: grant or revoke the `admin` custom claim.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use fleetsync_core::UserId;

use super::context::Workspace;

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Grant the `admin` claim to a user.
    Grant { uid: String },

    /// Remove the `admin` claim from a user.
    Revoke { uid: String },
}

pub async fn run(command: AdminCommand, workspace: &Workspace) -> Result<()> {
    match command {
        AdminCommand::Grant { uid } => {
            let uid = UserId::from(uid);
            if workspace.store.grant_admin(uid.clone()).await {
                tracing::info!(uid = %uid, "admin claim granted");
                println!("{} {uid} is now an admin", "✓".green());
            } else {
                println!("{uid} is already an admin");
            }
        }
        AdminCommand::Revoke { uid } => {
            let uid = UserId::from(uid);
            if workspace.store.revoke_admin(&uid).await {
                tracing::info!(uid = %uid, "admin claim revoked");
                println!("{} {uid} is no longer an admin", "✓".green());
            } else {
                println!("{uid} was not an admin");
            }
        }
    }
    workspace.commit().await
}
