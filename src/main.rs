use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "voxdesk")]
#[command(about = "Voice-to-action desktop core - configuration and diagnostics")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.voxdesk/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration (hotkeys, models, agents)
    Check {
        /// Print the problem list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which agent a transcript would trigger
    Dispatch {
        /// Transcript text
        text: String,
    },

    /// Report token estimates and the context reduction for a selection
    Budget {
        /// File holding the selected text
        selection: PathBuf,

        /// Model whose context limit applies (defaults to the configured model)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Remove a leading <think> block from text read on stdin
    Strip,

    /// Show usage statistics: words, speed, time saved and words per day
    Stats {
        /// Number of days in the daily breakdown
        #[arg(short, long, default_value_t = voxdesk::stats::DEFAULT_CHART_DAYS)]
        days: u32,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List recorded dictations and answers, newest first
    History {
        /// Maximum number of entries to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,

        /// Delete every entry
        #[arg(long)]
        clear: bool,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli
        .config
        .unwrap_or_else(voxdesk::Config::global_config_path);
    // History and stats live next to the config file
    let usage_dir = config_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(voxdesk::Config::global_config_dir);

    match cli.command {
        Commands::Check { json } => cli::check::check_command(&config_path, json)?,
        Commands::Dispatch { text } => cli::dispatch::dispatch_command(&config_path, &text)?,
        Commands::Budget { selection, model } => {
            cli::budget::budget_command(&config_path, &selection, model)?
        }
        Commands::Strip => cli::strip::strip_command()?,
        Commands::Stats { days, json } => cli::stats::stats_command(&usage_dir, days, json)?,
        Commands::History { limit, clear } => {
            cli::history::history_command(&usage_dir, limit, clear)?
        }
        Commands::Init { force } => cli::init::init_command(&config_path, force)?,
    }

    Ok(())
}
