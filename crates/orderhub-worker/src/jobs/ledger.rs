//! Ledger consistency check job.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use orderhub_service::LedgerConsistencyChecker;

use crate::handler::{JobExecutionError, JobHandler};

/// Runs the ledger consistency check per tick.
#[derive(Debug)]
pub struct LedgerCheckJob {
    checker: Arc<LedgerConsistencyChecker>,
}

impl LedgerCheckJob {
    /// Create the job around a checker.
    pub fn new(checker: Arc<LedgerConsistencyChecker>) -> Self {
        Self { checker }
    }
}

#[async_trait]
impl JobHandler for LedgerCheckJob {
    fn job_type(&self) -> &str {
        "ledger_check"
    }

    async fn execute(&self) -> Result<Value, JobExecutionError> {
        let report = self
            .checker
            .check()
            .await
            .map_err(JobExecutionError::from_service)?;

        Ok(json!({
            "task": "ledger_check",
            "checked": report.checked,
            "drifted": report.drifted,
            "repaired": report.repaired,
            "held": report.held,
        }))
    }
}
