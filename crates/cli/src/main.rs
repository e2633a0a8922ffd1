//! Coscribe CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Initialize configuration
//! - `chat`    — Interactive co-writing session or single-message mode
//! - `enhance` — One-shot prompt enhancement via the workflow webhook
//! - `doctor`  — Diagnose configuration health

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "coscribe",
    about = "Coscribe — chat-driven writing assistant with document history",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging and the activity tap
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Chat with the writing assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Load a document file into the store before starting
        #[arg(short, long)]
        document: Option<std::path::PathBuf>,
    },

    /// Rewrite a prompt through the workflow webhook
    Enhance {
        /// The prompt to enhance
        prompt: String,

        /// Attach a document file as context
        #[arg(long)]
        with_document: Option<std::path::PathBuf>,
    },

    /// Diagnose configuration health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat { message, document } => {
            commands::chat::run(message, document, cli.verbose).await?
        }
        Commands::Enhance {
            prompt,
            with_document,
        } => commands::enhance::run(&prompt, with_document).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
