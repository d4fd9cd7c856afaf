//! `fleetsync driver`: read the derived collection and run the
//! `assignDriver` callable.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use fleetsync_core::{DriverDocument, DriverStatus, DriverStore};
use fleetsync_sync::AssignDriverRequest;

use super::context::{caller, Workspace};

#[derive(Subcommand, Debug)]
pub enum DriverCommand {
    /// List driver records.
    List {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Set the bus and/or route on every record for a driver.
    Assign(AssignArgs),
}

#[derive(Args, Debug)]
pub struct AssignArgs {
    /// User id of the driver.
    pub driver_id: String,

    #[arg(long)]
    pub bus: Option<String>,

    #[arg(long)]
    pub route: Option<String>,

    /// Caller identity.
    #[arg(long = "as", value_name = "UID")]
    pub as_uid: Option<String>,
}

pub async fn run(command: DriverCommand, workspace: &Workspace) -> Result<()> {
    match command {
        DriverCommand::List { json } => {
            let drivers = workspace
                .store
                .list_drivers()
                .await
                .context("failed to list drivers")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&drivers)?);
            } else {
                print_table(drivers);
            }
            Ok(())
        }
        DriverCommand::Assign(args) => {
            let request = AssignDriverRequest {
                driver_id: Some(args.driver_id.clone()),
                assigned_bus_number: args.bus,
                assigned_route: args.route,
            };
            let response = workspace
                .callables(None)
                .assign_driver(&caller(args.as_uid), &request)
                .await
                .with_context(|| format!("assignDriver failed for '{}'", args.driver_id))?;
            workspace.commit().await?;
            println!("{} {}", "✓".green(), response.message);
            Ok(())
        }
    }
}

#[derive(Tabled)]
struct DriverRow {
    #[tabled(rename = "document")]
    document: String,
    #[tabled(rename = "driver")]
    driver: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "email")]
    email: String,
    #[tabled(rename = "bus")]
    bus: String,
    #[tabled(rename = "route")]
    route: String,
    #[tabled(rename = "status")]
    status: String,
}

fn print_table(drivers: Vec<DriverDocument>) {
    if drivers.is_empty() {
        println!("no drivers");
        return;
    }
    let rows: Vec<DriverRow> = drivers
        .into_iter()
        .map(|doc| {
            let record = doc.record;
            let status = match record.status {
                DriverStatus::Active => record.status.to_string().green().to_string(),
                DriverStatus::Inactive => record.status.to_string().red().to_string(),
            };
            DriverRow {
                document: doc.id.to_string(),
                driver: record.driver_id.to_string(),
                name: record.driver_name,
                email: record.driver_email,
                bus: record.assigned_bus_number,
                route: record.assigned_route,
                status,
            }
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
