//! Aggregate result of a batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{StateKind, ToolCallRecord};

/// Outcome counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub ok: usize,
    pub error: usize,
    pub rejected: usize,
}

impl Summary {
    pub fn from_records(records: &[ToolCallRecord]) -> Self {
        records.iter().fold(
            Self {
                total: records.len(),
                ..Self::default()
            },
            |mut summary, record| {
                match record.state().kind() {
                    StateKind::Ok => summary.ok += 1,
                    StateKind::Error => summary.error += 1,
                    StateKind::Rejected => summary.rejected += 1,
                    StateKind::Pending | StateKind::Running => {}
                }
                summary
            },
        )
    }
}

/// Records in input order plus derived counts.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    results: Vec<ToolCallRecord>,
    summary: Summary,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl AggregateReport {
    pub(crate) fn new(results: Vec<ToolCallRecord>, started_at: DateTime<Utc>) -> Self {
        let summary = Summary::from_records(&results);
        Self {
            results,
            summary,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Records, in the order the requests were given.
    pub fn results(&self) -> &[ToolCallRecord] {
        &self.results
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Find a record by call id.
    pub fn get(&self, id: &str) -> Option<&ToolCallRecord> {
        self.results.iter().find(|r| r.id() == id)
    }

    pub fn is_all_ok(&self) -> bool {
        self.summary.ok == self.summary.total
    }

    pub fn into_results(self) -> Vec<ToolCallRecord> {
        self.results
    }
}
