//! Commission ledger commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use orderhub_core::error::AppError;
use orderhub_core::types::id::UserId;
use orderhub_database::store::LedgerStore;
use orderhub_entity::ledger::ChallengeProgress;
use orderhub_service::{LedgerConsistencyChecker, LedgerService};

use crate::output::{self, OutputFormat};

/// Arguments for ledger commands
#[derive(Debug, Args)]
pub struct LedgerArgs {
    /// Ledger subcommand
    #[command(subcommand)]
    pub command: LedgerCommand,
}

/// Ledger subcommands
#[derive(Debug, Subcommand)]
pub enum LedgerCommand {
    /// List every volunteer's progress
    List,
    /// Show one volunteer's progress
    Show {
        /// Volunteer id
        volunteer_id: UserId,
    },
    /// Compare the ledger with active orders
    Check {
        /// Overwrite drifted entries with the recomputed value
        #[arg(long)]
        repair: bool,
        /// Skip the confirmation prompt when repairing
        #[arg(short, long)]
        yes: bool,
    },
    /// Apply a manual correction
    Adjust {
        /// Volunteer id
        volunteer_id: UserId,
        /// Signed unit change
        #[arg(allow_hyphen_values = true)]
        delta: i32,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct ProgressRow {
    #[tabled(rename = "Volunteer")]
    volunteer_id: String,
    #[tabled(rename = "Units")]
    confirmed_units: i32,
    #[tabled(rename = "Goal")]
    goal: i32,
    #[tabled(rename = "Reached")]
    goal_reached: bool,
    #[tabled(rename = "Updated")]
    updated_at: String,
}

impl From<&ChallengeProgress> for ProgressRow {
    fn from(entry: &ChallengeProgress) -> Self {
        Self {
            volunteer_id: entry.volunteer_id.to_string(),
            confirmed_units: entry.confirmed_units,
            goal: entry.goal,
            goal_reached: entry.goal_reached(),
            updated_at: entry.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute ledger commands
pub async fn execute(
    args: &LedgerArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let stores = super::connect_stores(&config).await?;
    let service = LedgerService::new(Arc::clone(&stores.ledger));

    match &args.command {
        LedgerCommand::List => {
            let rows: Vec<ProgressRow> = stores
                .ledger
                .list_all()
                .await?
                .iter()
                .map(ProgressRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        LedgerCommand::Show { volunteer_id } => {
            let entry = service.get(*volunteer_id).await?;
            output::print_item(&entry, format);
        }
        LedgerCommand::Check { repair, yes } => {
            if *repair && !*yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt("Overwrite drifted ledger entries with recomputed values?")
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Prompt failed: {e}")))?;
                if !confirm {
                    println!("Aborted.");
                    return Ok(());
                }
            }

            let checker = LedgerConsistencyChecker::new(
                Arc::clone(&stores.orders),
                Arc::clone(&stores.ledger),
                *repair,
            );
            let report = checker.check().await?;
            output::print_item(&report, format);
            if report.drifted == 0 {
                output::print_success("Ledger matches active orders.");
            } else if report.repaired + report.held < report.drifted {
                output::print_warning("Drift found; rerun with --repair to correct it.");
            }
            if report.held > 0 {
                output::print_warning(
                    "Some drift involves delivery assignments and was left for manual review.",
                );
            }
        }
        LedgerCommand::Adjust {
            volunteer_id,
            delta,
        } => match service.adjust(*volunteer_id, *delta).await? {
            Some(entry) => output::print_item(&entry, format),
            None => output::print_warning("No ledger entry to adjust."),
        },
    }

    stores.close().await;
    Ok(())
}
