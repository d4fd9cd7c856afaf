//! fleetsync: local host for the driver sync engine.
//!
//! # Usage
//!
//! ```text
//! fleetsync user put <id> [--role <role>] [--first-name ..] [--last-name ..] [--email ..] [--phone ..]
//! fleetsync user rm <id>
//! fleetsync user list
//! fleetsync driver list [--json]
//! fleetsync driver assign <driver-id> [--bus <bus>] [--route <route>] --as <uid>
//! fleetsync reconcile --as <uid> [--concurrency <n>] [--json]
//! fleetsync admin grant|revoke <uid>
//! ```
//!
//! Global: `--home <dir>` (or `FLEETSYNC_HOME`), `--log-format text|json`.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use commands::{
    admin::AdminCommand, context::Workspace, driver::DriverCommand, reconcile::ReconcileArgs,
    user::UserCommand,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "fleetsync",
    version,
    about = "Keep the drivers collection in step with users",
    long_about = None,
)]
struct Cli {
    /// Directory holding `.fleetsync/`. Defaults to the user's home.
    #[arg(long, global = true, env = "FLEETSYNC_HOME")]
    home: Option<PathBuf>,

    /// Log line format on stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write or delete users; every write fires driver sync.
    User {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Inspect and assign driver records.
    Driver {
        #[command(subcommand)]
        command: DriverCommand,
    },

    /// Rebuild every driver record from the users collection (admin only).
    Reconcile(ReconcileArgs),

    /// Grant or revoke the `admin` claim.
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let workspace = Workspace::open(cli.home)?;
    match cli.command {
        Commands::User { command } => commands::user::run(command, &workspace).await,
        Commands::Driver { command } => commands::driver::run(command, &workspace).await,
        Commands::Reconcile(args) => args.run(&workspace).await,
        Commands::Admin { command } => commands::admin::run(command, &workspace).await,
    }
}

fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
