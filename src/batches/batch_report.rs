use crate::batches::{Batch, BatchStatus};
use serde::Serialize;

/// Describes what caused the batch report.
#[derive(Serialize, Debug, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum BatchReportTrigger {
    /// Periodic report for a batch that is still in progress.
    Progress,
    /// Final report emitted once the batch is closed.
    Completion,
}

/// Snapshot of the batch progress handed to the reporter.
#[derive(Serialize, Debug, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub trigger: BatchReportTrigger,
    pub status: BatchStatus,
    pub batch: Batch,
}

impl BatchReport {
    pub fn progress(batch: Batch) -> Self {
        Self {
            trigger: BatchReportTrigger::Progress,
            status: batch.status(),
            batch,
        }
    }

    pub fn completion(batch: Batch) -> Self {
        Self {
            trigger: BatchReportTrigger::Completion,
            status: batch.status(),
            batch,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{batches::BatchReport, tests::mock_batch};
    use insta::assert_json_snapshot;

    #[test]
    fn serialization() -> anyhow::Result<()> {
        assert_json_snapshot!(BatchReport::progress(mock_batch(2)?), @r###"
        {
          "trigger": "progress",
          "status": "open",
          "batch": {
            "id": "00000000-0000-0000-0000-000000000001",
            "from": "dev@batchmail.dev",
            "emailCount": 2,
            "successCount": 0,
            "failCount": 0,
            "startAt": "2000-01-01T10:00:00Z",
            "finishAt": null
          }
        }
        "###);

        Ok(())
    }
}
