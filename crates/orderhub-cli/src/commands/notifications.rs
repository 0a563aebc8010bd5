//! Scheduled notification commands.

use chrono::Utc;
use clap::{Args, Subcommand};

use orderhub_api::AppState;
use orderhub_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for notification commands
#[derive(Debug, Args)]
pub struct NotificationsArgs {
    /// Notification subcommand
    #[command(subcommand)]
    pub command: NotificationsCommand,
}

/// Notification subcommands
#[derive(Debug, Subcommand)]
pub enum NotificationsCommand {
    /// Fire every scheduled notification that is due now
    Process,
}

/// Execute notification commands
pub async fn execute(
    args: &NotificationsArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let stores = super::connect_stores(&config).await?;
    let state = AppState::new(config, stores.clone());

    match &args.command {
        NotificationsCommand::Process => {
            let summary = state.processor.process_due(Utc::now()).await?;
            output::print_item(&summary, format);
            if summary.error_count > 0 {
                output::print_warning(&format!(
                    "{} scheduled notification(s) failed; see the log",
                    summary.error_count
                ));
            }
        }
    }

    stores.close().await;
    Ok(())
}
