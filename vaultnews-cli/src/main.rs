//! # vaultnews CLI
//!
//! Command-line interface for the vaultnews digest generator.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vaultnews")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "vaultnews.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new vaultnews project
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Refresh the classification and write the digest
    Sync {
        /// Print the digest instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show what is currently detected, marked and pointed as new
    Scan {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Retire markers that are older than the retirement window
    Cleanup {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Re-synchronize the digest whenever the vault changes
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { path } => commands::init_project(path.as_deref()),
        Commands::Sync { dry_run } => commands::sync_digest(&cli.config, dry_run),
        Commands::Scan { json } => commands::scan_vault(&cli.config, json),
        Commands::Cleanup { json } => commands::cleanup_vault(&cli.config, json),
        Commands::Watch => commands::watch_vault(&cli.config).await,
    }
}
