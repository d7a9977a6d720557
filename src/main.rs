use anyhow::{Context, Result};
use clap::Parser;
use job_finder::cli::{handle_command, Cli};
use job_finder::ConfigManager;
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigManager::load()?.with_overrides(cli.api_url.clone(), cli.export_dir.clone());

    // Log to a file so stdout stays free for the session output
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open(&config.environment.log_file)
        .with_context(|| {
            format!(
                "Failed to open log file {}",
                config.environment.log_file.display()
            )
        })?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Job service: {}", config.service.api_base_url);
    info!(
        "Poll interval: {}s, export dir: {}",
        config.service.poll_interval.as_secs(),
        config.environment.export_dir.display()
    );

    handle_command(cli, config).await
}
