//! Run and stage summaries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use diamond_core::{NodeLabel, RecordIssue, RelType};
use serde::Serialize;
use uuid::Uuid;

use crate::context::report_issue;
use crate::pipeline::Stage;

/// What one stage did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    /// Records the stage consumed.
    pub records: usize,
    /// Directives that took effect (entities upserted, edges merged).
    pub written: usize,
    /// Records rejected as a whole.
    pub skipped: usize,
    /// Attributes dropped from otherwise valid records.
    pub dropped_attributes: usize,
}

impl StageReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            records: 0,
            written: 0,
            skipped: 0,
            dropped_attributes: 0,
        }
    }

    /// Log the issue and count it.
    pub fn record_issue(&mut self, line: u64, issue: &RecordIssue) {
        report_issue(self.stage, line, issue);
        if issue.rejects_record() {
            self.skipped += 1;
        } else {
            self.dropped_attributes += 1;
        }
    }

    pub fn log_completion(&self) {
        tracing::info!(
            stage = %self.stage,
            records = self.records,
            written = self.written,
            skipped = self.skipped,
            dropped_attributes = self.dropped_attributes,
            "Stage complete"
        );
    }
}

/// Summary of a full pipeline run, printed as JSON by the binary.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stages: Vec<StageReport>,
    pub nodes: BTreeMap<NodeLabel, i64>,
    pub edges: BTreeMap<RelType, i64>,
}

impl RunReport {
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|r| r.stage == stage)
    }

    pub fn total_skipped(&self) -> usize {
        self.stages.iter().map(|r| r.skipped).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_issue_counts_by_kind() {
        let mut report = StageReport::new(Stage::LoadPlayers);
        report.record_issue(
            2,
            &RecordIssue::MissingRequiredField { field: "Name" },
        );
        report.record_issue(
            3,
            &RecordIssue::MalformedValue {
                field: "Height",
                value: "tall".to_string(),
            },
        );
        assert_eq!(report.skipped, 1);
        assert_eq!(report.dropped_attributes, 1);
    }

    #[test]
    fn test_run_report_serializes_counts_by_name() {
        let report = RunReport {
            run_id: Uuid::nil(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            stages: vec![StageReport::new(Stage::WireCoaches)],
            nodes: BTreeMap::from([(NodeLabel::Coach, 3)]),
            edges: BTreeMap::from([(RelType::Assists, 2)]),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["nodes"]["Coach"], 3);
        assert_eq!(json["edges"]["ASSISTS"], 2);
        assert_eq!(json["stages"][0]["stage"], "wire_coaches");
    }
}
