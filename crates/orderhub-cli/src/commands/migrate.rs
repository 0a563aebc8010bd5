//! Database migration management commands.

use clap::{Args, Subcommand};

use orderhub_core::config::DatabaseProvider;
use orderhub_core::error::AppError;
use orderhub_database::DatabasePool;
use orderhub_database::migration::run_migrations;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config_path: &str) -> Result<(), AppError> {
    let mut config = super::load_config(config_path)?;
    if config.database.provider == DatabaseProvider::Memory {
        output::print_warning("The memory provider has no schema to migrate.");
        return Ok(());
    }

    // Migrations run explicitly below.
    config.database.run_migrations = false;
    let pool = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            run_migrations(pool.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
    }

    pool.close().await;
    Ok(())
}
