mod commands;
mod config;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::CliAppConfig::load().context("Failed to load config")?;

    let filter = EnvFilter::try_new(&config.log.level)
        .with_context(|| format!("Invalid log level: {}", config.log.level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!(?config, "Configuration loaded");

    let store = config
        .storage
        .open()
        .await
        .context("Failed to open fragment store")?;

    let mut stdout = std::io::stdout().lock();
    commands::run(cli, &*store, &mut stdout).await
}
