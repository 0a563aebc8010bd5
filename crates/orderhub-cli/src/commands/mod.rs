//! CLI command definitions and dispatch.

pub mod ledger;
pub mod migrate;
pub mod notifications;
pub mod serve;

use clap::{Parser, Subcommand};

use orderhub_core::config::AppConfig;
use orderhub_core::error::AppError;
use orderhub_database::Stores;

use crate::output::OutputFormat;

/// OrderHub: order lifecycle, commission ledger, scheduled notifications
#[derive(Debug, Parser)]
#[command(name = "orderhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the OrderHub server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Scheduled notification operations
    Notifications(notifications::NotificationsArgs),
    /// Commission ledger operations
    Ledger(ledger::LedgerArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.config).await,
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Notifications(args) => {
                notifications::execute(args, &self.config, self.format).await
            }
            Commands::Ledger(args) => ledger::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(config_path)
}

/// Helper: connect the configured stores
pub async fn connect_stores(config: &AppConfig) -> Result<Stores, AppError> {
    Stores::connect(&config.database, config.ledger.default_goal).await
}
