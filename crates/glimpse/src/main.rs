//! Glimpse CLI - compare image recognition across AI providers.
//!
//! Sends an image to one or more vision LLMs with a task-specific prompt and
//! prints normalized JSON results.
//!
//! # Usage
//!
//! ```bash
//! # Recognize a receipt with a configured model
//! glimpse recognize receipt.jpg --model-name gemini-flash --type receipt
//!
//! # Compare every configured model on one image
//! glimpse compare https://example.com/scan.png --format jsonl
//!
//! # Recognize many images, three at a time
//! glimpse batch page-*.png --model-name gpt4o --concurrency 3
//!
//! # View configuration
//! glimpse config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Glimpse - compare image recognition across AI providers.
#[derive(Parser, Debug)]
#[command(name = "glimpse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Recognize one image with one model
    Recognize(cli::recognize::RecognizeArgs),

    /// Run one image against several models and score them
    Compare(cli::compare::CompareArgs),

    /// Recognize many images with one model
    Batch(cli::batch::BatchArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match glimpse_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `glimpse config path`."
            );
            glimpse_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Glimpse v{}", glimpse_core::VERSION);

    match cli.command {
        Commands::Recognize(args) => cli::recognize::execute(args, &config).await,
        Commands::Compare(args) => cli::compare::execute(args, &config).await,
        Commands::Batch(args) => cli::batch::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
