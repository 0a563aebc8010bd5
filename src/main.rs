//! OrderHub Server: order lifecycle, commission ledger, and scheduled
//! notifications.
//!
//! Main entry point that loads configuration, sets up logging, and hands
//! off to the API crate.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use orderhub_core::config::{AppConfig, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_configuration().context("Failed to load configuration")?;

    init_logging(&config.logging);
    tracing::info!("Starting OrderHub v{}", env!("CARGO_PKG_VERSION"));

    orderhub_api::run_server(config)
        .await
        .context("Server error")?;

    Ok(())
}

/// Load `config/default.toml`, the `ORDERHUB_ENV` overlay, and
/// `ORDERHUB__*` environment overrides.
fn load_configuration() -> anyhow::Result<AppConfig> {
    let env = std::env::var("ORDERHUB_ENV").unwrap_or_else(|_| "development".to_string());
    Ok(AppConfig::load(&env)?)
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
