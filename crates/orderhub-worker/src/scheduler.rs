//! Cron scheduler for periodic background jobs.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{debug, info};

use orderhub_core::config::WorkerConfig;
use orderhub_core::error::AppError;

use crate::handler::{GuardedJob, JobHandler};

/// Cron-based scheduler for periodic background jobs.
pub struct CronScheduler {
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler })
    }

    /// Register the scheduled notification and ledger check jobs on the
    /// cadences in `config`.
    pub async fn register_default_jobs(
        &self,
        config: &WorkerConfig,
        notifications: Arc<dyn JobHandler>,
        ledger_check: Arc<dyn JobHandler>,
    ) -> Result<(), AppError> {
        self.register(&config.scheduled_notifications_cron, notifications)
            .await?;
        self.register(&config.ledger_check_cron, ledger_check).await?;

        info!("All scheduled jobs registered");
        Ok(())
    }

    /// Run `handler` on `cron` (six fields, seconds first). Ticks that fire
    /// while the previous run is still going are skipped.
    pub async fn register(&self, cron: &str, handler: Arc<dyn JobHandler>) -> Result<(), AppError> {
        let job = Arc::new(GuardedJob::new(handler));
        let job_type = job.job_type().to_string();

        let cron_job = CronJob::new_async(cron, {
            let job = Arc::clone(&job);
            move |_uuid, _lock| {
                let job = Arc::clone(&job);
                Box::pin(async move {
                    debug!(job_type = job.job_type(), "Cron tick");
                    job.run().await;
                })
            }
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid cron expression '{cron}' for {job_type}: {e}"
            ))
        })?;

        self.scheduler.add(cron_job).await.map_err(|e| {
            AppError::internal(format!("Failed to add {job_type} schedule: {e}"))
        })?;

        info!(job_type = %job_type, cron, "Registered scheduled job");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        info!("Cron scheduler shut down");
        Ok(())
    }
}
