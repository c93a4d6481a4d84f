//! SyncBridge: command-line front end for the file-sync daemon client.
//!
//! # Usage
//!
//! ```text
//! syncbridge status <PATH>... [--json]
//! syncbridge pin <PATH>...
//! syncbridge unpin <PATH>...
//! syncbridge sync <PATH>...
//! syncbridge watch [--for-secs N]
//! syncbridge menu <PATH>...
//! syncbridge root
//! ```
//!
//! `--demo` runs any command against a built-in scripted daemon instead of
//! the session bus.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{action::ActionArgs, menu::MenuArgs, status::StatusArgs, watch::WatchArgs};
use syncbridge_core::ActionKind;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "syncbridge",
    version,
    about = "Query and drive the file-sync daemon from the terminal",
    long_about = None,
)]
struct Cli {
    /// Use a built-in scripted daemon instead of the session bus.
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the sync status of one or more paths.
    Status(StatusArgs),

    /// Download files and keep them available offline.
    Pin(ActionArgs),

    /// Free up space by turning files back into cloud-only placeholders.
    Unpin(ActionArgs),

    /// Sync paths now.
    Sync(ActionArgs),

    /// Print status and availability events as they arrive.
    Watch(WatchArgs),

    /// Print the sync root the daemon reports.
    Root,

    /// Show which file-manager actions a selection would be offered.
    Menu(MenuArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    syncbridge_client::init_tracing();
    let cli = Cli::parse();
    let session = commands::Session::open(cli.demo)?;

    match cli.command {
        Commands::Status(args) => args.run(&session),
        Commands::Pin(args) => args.run(&session, ActionKind::Pin),
        Commands::Unpin(args) => args.run(&session, ActionKind::Unpin),
        Commands::Sync(args) => args.run(&session, ActionKind::Sync),
        Commands::Watch(args) => args.run(&session),
        Commands::Root => commands::root::run(&session),
        Commands::Menu(args) => args.run(&session),
    }
}
