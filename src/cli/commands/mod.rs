mod subcommands;


use crate::config::load_config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "keepsake")]
#[command(about = "Chat history migration and relationship analytics")]
#[command(version)]
pub struct Cli {
    /// Config file (default: ~/.keepsake/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Replace an existing config
        #[arg(long)]
        force: bool,
    },
    /// Upload the chat export to the configured store
    Migrate {
        /// Chat export to read (default: source.chatPath)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Parse and batch, but send nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Build the relationship digest
    Analyze {
        #[arg(long)]
        input: Option<PathBuf>,
        /// Digest to write (default: analysis.outputPath)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compute word, activity and mood analytics
    Stats {
        /// Chat export to read (default: stats.inputPath, then source.chatPath)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Analytics to write (default: stats.outputPath)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show config location, inputs and store readiness
    Status,
}

/// Parse arguments and dispatch.
///
/// Errors before a job starts (bad config, missing store credentials) are
/// returned. Failures inside a job are logged and the command still succeeds.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init { force } => {
            subcommands::init(config_path, force)?;
        }
        Commands::Migrate { input, dry_run } => {
            let config = load_config(config_path)?;
            subcommands::migrate(&config, input, dry_run).await?;
        }
        Commands::Analyze { input, output } => {
            let config = load_config(config_path)?;
            subcommands::analyze(&config, input, output)?;
        }
        Commands::Stats { input, output } => {
            let config = load_config(config_path)?;
            subcommands::stats(&config, input, output)?;
        }
        Commands::Status => {
            let config = load_config(config_path)?;
            subcommands::status(&config, config_path)?;
        }
    }

    Ok(())
}

fn resolve(explicit: Option<PathBuf>, configured: impl FnOnce() -> PathBuf) -> PathBuf {
    explicit.unwrap_or_else(configured)
}
