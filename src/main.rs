use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use tracing::info;
use workshift::cli::{handle_command, Cli};
use workshift::environment::EnvironmentConfig;
use workshift::risk::RiskModel;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_DIRECTIVES: &str = "workshift=info,rocket::server=off";

fn init_logging() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES));

    match std::env::var("WORKSHIFT_LOG_FILE") {
        Ok(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true) // Clear file on startup
                .open(&path)
                .with_context(|| format!("Failed to open log file: {}", path))?;

            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(file)
                        .with_current_span(false)
                        .with_span_list(false),
                )
                .with(filter)
                .init();
        }
        Err(_) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging first
    init_logging()?;

    let cli = Cli::parse();

    let config = EnvironmentConfig::load()?;
    info!("Raw data: {}", config.raw_data_path.display());
    info!("Processed output: {}", config.processed_path.display());

    let model = RiskModel::new().context("Built-in role profile table is invalid")?;

    handle_command(cli, config, model).await
}
