//! Per-run context threaded through every stage.

use diamond_core::RecordIssue;
use diamond_graph::{Directive, GraphError, GraphGateway, Outcome};

use crate::pipeline::Stage;
use crate::retry::{with_retry, RetryPolicy};

/// The store handle, target database and call policy for one pipeline run.
///
/// Owned by the orchestrator for the run's duration; loaders and wirers only
/// ever reach the store through it.
pub struct StageContext<'a> {
    gateway: &'a dyn GraphGateway,
    database: String,
    retry: RetryPolicy,
}

impl<'a> StageContext<'a> {
    pub fn new(
        gateway: &'a dyn GraphGateway,
        database: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            gateway,
            database: database.into(),
            retry,
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Execute one directive with the run's timeout and retry policy.
    pub async fn execute(&self, directive: &Directive) -> Result<Outcome, GraphError> {
        with_retry(&self.retry, directive.kind(), || {
            self.gateway.execute(directive, &self.database)
        })
        .await
    }

    pub async fn verify_connectivity(&self) -> Result<(), GraphError> {
        with_retry(&self.retry, "verify_connectivity", || {
            self.gateway.verify_connectivity()
        })
        .await
    }
}

/// Log a per-record issue under the stage that hit it.
pub(crate) fn report_issue(stage: Stage, line: u64, issue: &RecordIssue) {
    if issue.rejects_record() {
        tracing::warn!(stage = %stage, line, issue = %issue, "Skipping record");
    } else {
        tracing::warn!(stage = %stage, line, issue = %issue, "Dropping attribute");
    }
}
