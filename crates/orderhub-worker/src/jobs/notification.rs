//! Scheduled notification dispatch job.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};

use orderhub_service::ScheduledNotificationProcessor;

use crate::handler::{JobExecutionError, JobHandler};

/// Runs one scheduled notification pass per tick.
#[derive(Debug)]
pub struct ScheduledNotificationJob {
    processor: Arc<ScheduledNotificationProcessor>,
}

impl ScheduledNotificationJob {
    /// Create the job around a processor.
    pub fn new(processor: Arc<ScheduledNotificationProcessor>) -> Self {
        Self { processor }
    }
}

#[async_trait]
impl JobHandler for ScheduledNotificationJob {
    fn job_type(&self) -> &str {
        "scheduled_notifications"
    }

    async fn execute(&self) -> Result<Value, JobExecutionError> {
        let summary = self
            .processor
            .process_due(Utc::now())
            .await
            .map_err(JobExecutionError::from_service)?;

        Ok(json!({
            "task": "scheduled_notifications",
            "processedCount": summary.processed_count,
            "errorCount": summary.error_count,
        }))
    }
}
