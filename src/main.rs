//! Retrace - session-replay telemetry engine.
//!
//! Main entry point for the retrace harness CLI.

mod cli;
mod decode;
mod demo;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use retrace_config::{AgentConfig, ConfigLoader};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load(path).unwrap_or_else(|err| {
            warn!("failed to load config from {path:?}: {err}; using defaults");
            AgentConfig::default()
        }),
        None => AgentConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Demo {
            out_dir,
            upload_url,
            pumps,
        } => demo::run(config, &out_dir, upload_url, pumps).await,
        Commands::Decode { file } => decode::run(&file),
    }
}
