//! `fleetsync user`: host-side writes to the users collection. Each write
//! is delivered to the sync trigger as a before/after pair.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use fleetsync_core::{UserId, UserRecord};
use fleetsync_sync::{on_user_write, SyncAction, UserChange};

use super::context::Workspace;

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Write the full contents of a user document.
    Put(PutArgs),

    /// Delete a user document.
    Rm {
        /// User id.
        id: String,
    },

    /// List all users.
    List,
}

#[derive(Args, Debug)]
pub struct PutArgs {
    /// User id.
    pub id: String,

    #[arg(long)]
    pub role: Option<String>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,
}

impl PutArgs {
    fn record(&self) -> UserRecord {
        UserRecord {
            role: self.role.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

pub async fn run(command: UserCommand, workspace: &Workspace) -> Result<()> {
    match command {
        UserCommand::Put(args) => {
            let user_id = UserId::from(args.id.as_str());
            let after = args.record();
            let before = workspace.store.put_user(user_id.clone(), after.clone()).await;
            let change = UserChange {
                user_id,
                before,
                after: Some(after),
            };
            deliver(workspace, change).await
        }
        UserCommand::Rm { id } => {
            let user_id = UserId::from(id);
            let Some(before) = workspace.store.remove_user(&user_id).await else {
                anyhow::bail!("user '{user_id}' does not exist");
            };
            let change = UserChange {
                user_id,
                before: Some(before),
                after: None,
            };
            deliver(workspace, change).await
        }
        UserCommand::List => {
            print_users(workspace.store.users().await);
            Ok(())
        }
    }
}

/// Fire the trigger, then persist. The user write is kept even if the
/// trigger fails; a later write or `reconcile` repairs the drivers.
async fn deliver(workspace: &Workspace, change: UserChange) -> Result<()> {
    let outcome = on_user_write(&workspace.synchronizer(), &change).await;
    workspace.commit().await?;
    let actions = outcome
        .with_context(|| format!("driver sync failed for user '{}'", change.user_id))?;

    println!("{} {}", "wrote user".bold(), change.user_id);
    for action in &actions {
        println!("  {}", describe(action));
    }
    Ok(())
}

fn describe(action: &SyncAction) -> String {
    match action {
        SyncAction::Created { document } => format!("{} driver {document}", "created".green()),
        SyncAction::AlreadyPresent { matches } => {
            format!("{} ({matches} existing)", "driver already present".dimmed())
        }
        SyncAction::Reactivated { records } => {
            format!("{} {records} driver record(s)", "reactivated".green())
        }
        SyncAction::Deactivated { records } => {
            format!("{} {records} driver record(s)", "deactivated".yellow())
        }
        SyncAction::ProfileSynced { records } => {
            format!("{} {records} driver record(s)", "synced".cyan())
        }
    }
}

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "role")]
    role: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "email")]
    email: String,
    #[tabled(rename = "phone")]
    phone: String,
}

fn print_users(users: Vec<(UserId, UserRecord)>) {
    if users.is_empty() {
        println!("no users");
        return;
    }
    let rows: Vec<UserRow> = users
        .into_iter()
        .map(|(id, user)| UserRow {
            id: id.to_string(),
            role: user.role.clone().unwrap_or_default(),
            name: user.display_name(),
            email: user.email().to_string(),
            phone: user.phone().to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
