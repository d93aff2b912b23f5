//! ClipView - clipboard history viewer
//!
//! This is the main entry point for the ClipView binary.

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipview::cli::{Cli, CliHandler};
use clipview::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_config(cli.config.as_deref())?;

    // Initialize logging; stderr keeps stdout free for the viewer
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.log_level.clone()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("clipview={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!("ClipView v{}", env!("CARGO_PKG_VERSION"));

    let mut handler = CliHandler::with_config(config, cli.config, cli.history_file);
    handler.handle_command(cli.command).await?;

    Ok(())
}
