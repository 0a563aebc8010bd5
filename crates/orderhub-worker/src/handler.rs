//! Job handler trait and single-flight execution.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info, warn};

use orderhub_core::error::{AppError, ErrorKind};

/// A unit of periodic background work.
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Name used in logs.
    fn job_type(&self) -> &str;

    /// Run the job once and describe what it did.
    async fn execute(&self) -> Result<Value, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure; the next tick will fail the same way.
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Transient failure; the next tick may succeed.
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

impl JobExecutionError {
    /// Classify a service error: persistence and availability problems are
    /// worth another try, anything else is not.
    pub fn from_service(err: AppError) -> Self {
        match err.kind {
            ErrorKind::Database | ErrorKind::ServiceUnavailable | ErrorKind::ExternalService => {
                Self::Transient(err.to_string())
            }
            ErrorKind::Configuration | ErrorKind::Validation => Self::Permanent(err.to_string()),
            _ => Self::Internal(err),
        }
    }
}

/// What happened on one tick.
#[derive(Debug)]
pub enum JobRun {
    /// A previous run was still in progress.
    Skipped,
    /// The job finished.
    Completed(Value),
    /// The job failed.
    Failed(JobExecutionError),
}

/// Runs a handler with at most one execution in flight.
#[derive(Debug)]
pub struct GuardedJob {
    handler: Arc<dyn JobHandler>,
    running: AtomicBool,
}

/// Clears the running flag when dropped, including on panic.
struct RunningFlag<'a>(&'a AtomicBool);

impl Drop for RunningFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl GuardedJob {
    /// Wrap a handler.
    pub fn new(handler: Arc<dyn JobHandler>) -> Self {
        Self {
            handler,
            running: AtomicBool::new(false),
        }
    }

    /// The wrapped handler's job type.
    pub fn job_type(&self) -> &str {
        self.handler.job_type()
    }

    /// Run the handler unless a run is already in progress.
    pub async fn run(&self) -> JobRun {
        let job_type = self.handler.job_type();
        if self
            .running
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            warn!(job_type, "Previous run still in progress; skipping tick");
            return JobRun::Skipped;
        }
        let _flag = RunningFlag(&self.running);

        match self.handler.execute().await {
            Ok(result) => {
                info!(job_type, result = %result, "Job completed");
                JobRun::Completed(result)
            }
            Err(e @ JobExecutionError::Transient(_)) => {
                warn!(job_type, error = %e, "Job failed; will run again next tick");
                JobRun::Failed(e)
            }
            Err(e) => {
                error!(job_type, error = %e, "Job failed");
                JobRun::Failed(e)
            }
        }
    }
}
