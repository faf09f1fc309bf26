use crate::batches::BatchReport;
use async_trait::async_trait;
use tracing::info;

/// Notifier that receives batch progress reports.
#[async_trait]
pub trait BatchReporter: Send + Sync {
    async fn report(&self, report: &BatchReport) -> anyhow::Result<()>;
}

/// Reporter that writes batch reports to the server log.
#[derive(Debug, Default, Copy, Clone)]
pub struct ServerLogReporter;

#[async_trait]
impl BatchReporter for ServerLogReporter {
    async fn report(&self, report: &BatchReport) -> anyhow::Result<()> {
        let batch = &report.batch;
        info!(
            batch.id = %batch.id,
            batch.trigger = ?report.trigger,
            batch.status = ?report.status,
            batch.sender = %batch.sender,
            batch.email_count = batch.email_count,
            batch.success_count = batch.success_count,
            batch.fail_count = batch.fail_count,
            "Batch {} progress: {} of {} emails resolved ({} sent, {} failed).",
            batch.id,
            batch.resolved_count(),
            batch.email_count,
            batch.success_count,
            batch.fail_count
        );

        Ok(())
    }
}
