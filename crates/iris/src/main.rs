//! Iris CLI - describe batches of images with a vision-capable model.
//!
//! Iris is the image intake step of an agent: hand it a list of image paths
//! and it returns one text report describing each image, plus an error line
//! for every path it could not handle.
//!
//! # Usage
//!
//! ```bash
//! # Describe two screenshots
//! iris describe login.png dashboard.png
//!
//! # Structured output
//! iris describe ./shots/*.png --format json
//!
//! # View configuration
//! iris config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;
mod rate_limit;

/// Iris - describe images with a vision-capable language model.
#[derive(Parser, Debug)]
#[command(name = "iris")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "IRIS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Describe a batch of images
    Describe(cli::describe::DescribeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(iris_core::Config::default_path);
    let config = match &cli.config {
        Some(path) => iris_core::Config::load_from(path)?,
        None => match iris_core::Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `iris config path`."
                );
                iris_core::Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Iris v{}", iris_core::VERSION);

    match cli.command {
        Commands::Describe(args) => cli::describe::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, &config, &config_path).await,
    }
}
