//! Main entry point for the Opus Translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use opus_translator::cli::commands::{self, Commands};
use opus_translator::TranslatorConfig;

/// Opus Translator - translate text with preloaded opus-mt models
#[derive(Parser, Debug)]
#[command(name = "opus-translator", version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to ./translator.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Use deterministic mock models instead of downloading weights
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("opus_translator={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = TranslatorConfig::load(args.config.as_deref())?;

    // Execute command
    match args.command {
        Some(Commands::Serve { host, port }) => {
            commands::handle_serve(config, host, port, args.mock).await?;
        }
        Some(Commands::Translate { pair, text }) => {
            commands::handle_translate(config, pair, text, args.mock).await?;
        }
        Some(Commands::Pairs) => {
            commands::handle_pairs(&config)?;
        }
        None => {
            commands::handle_serve(config, None, None, args.mock).await?;
        }
    }

    Ok(())
}
