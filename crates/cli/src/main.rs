//! Parley CLI — the main entry point.
//!
//! Commands:
//! - `chat`     — Interactive chat (or a single message with `--message`)
//! - `demos`    — List demo personas
//! - `models`   — List selectable models
//! - `config`   — Show, locate or validate the configuration
//! - `feedback` — Show the feedback log

use clap::{Parser, Subcommand};

mod commands;
mod input;
mod render;

#[derive(Parser)]
#[command(
    name = "parley",
    about = "Parley — a terminal chat demo on a hosted completion API",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with a demo persona
    Chat {
        /// Demo profile to load (falls back to a generic bot if unknown)
        #[arg(short, long)]
        demo: Option<String>,

        /// Model to start with
        #[arg(short = 'M', long)]
        model: Option<String>,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// List demo personas
    Demos,

    /// List selectable models
    Models,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Feedback log
    Feedback {
        #[command(subcommand)]
        action: FeedbackAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file path
    Path,
    /// Load and validate the configuration
    Validate,
}

#[derive(Subcommand)]
enum FeedbackAction {
    /// Print every logged record as a table
    Show,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing; stdout belongs to the chat transcript.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Chat {
            demo,
            model,
            message,
        } => commands::chat::run(demo, model, message).await?,
        Commands::Demos => commands::demos::run().await?,
        Commands::Models => commands::models::run().await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
            ConfigAction::Validate => commands::config_cmd::validate().await?,
        },
        Commands::Feedback { action } => match action {
            FeedbackAction::Show => commands::feedback::show().await?,
        },
    }

    Ok(())
}
