use clap::{Parser, Subcommand};
use colored::*;
use plugin_sync::commands::*;
use plugin_sync::core::Result;
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plugin-sync")]
#[command(about = "Repository synchronization engine for plugin checkouts")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Plugin root folder (overrides the configured root)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all checkouts and their state
    List,
    /// Fetch and re-inspect every tracked checkout
    Refresh {
        /// Skip confirmation prompts
        #[arg(long)]
        yes: bool,
    },
    /// Fast-forward a checkout to its upstream tip
    Update {
        /// Checkout name
        name: String,
    },
    /// Hard-reset a checkout to the parent of HEAD
    Revert {
        /// Checkout name
        name: String,
    },
    /// Switch a checkout to a branch, snapping to the remote state
    Switch {
        /// Checkout name
        name: String,
        /// Branch to switch to
        branch: String,
    },
    /// Clone a new checkout into the root (URL may end in /tree/<branch>)
    Clone {
        /// Clone URL
        url: String,
    },
    /// Delete a checkout and its record
    Delete {
        /// Checkout name
        name: String,
        /// Skip confirmation prompts
        #[arg(long)]
        yes: bool,
    },
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::List => execute_list(cli.root),
        Commands::Refresh { yes } => execute_refresh(cli.root, yes),
        Commands::Update { name } => execute_update(cli.root, &name),
        Commands::Revert { name } => execute_revert(cli.root, &name),
        Commands::Switch { name, branch } => execute_switch(cli.root, &name, &branch),
        Commands::Clone { url } => execute_clone(cli.root, &url),
        Commands::Delete { name, yes } => execute_delete(cli.root, &name, yes),
    }
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "warn");
    }
    env_logger::init();

    if let Err(e) = run(cli) {
        eprintln!("\n{} {}\n", "✕ Error:".red(), e.to_string().white());
        std::process::exit(1);
    }
}
