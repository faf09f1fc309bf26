use crate::{api::Api, mailer::EmailTransport};
use std::{sync::Arc, time::Instant};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// Defines a maximum number of batches that can be reported during a single job tick.
const MAX_BATCHES_TO_REPORT: usize = 100;

/// The job executes on a regular interval to report progress of the batches that are still open.
pub(crate) struct BatchReportsSendJob;
impl BatchReportsSendJob {
    /// Creates a new `BatchReportsSend` job.
    pub fn create<ET: EmailTransport>(api: Arc<Api<ET>>) -> anyhow::Result<Job> {
        let schedule = api.config.jobs.batch_reports.clone();
        Ok(Job::new_async(schedule.as_str(), move |_, scheduler| {
            let api = api.clone();
            Box::pin(async move {
                if let Err(err) = Self::execute(api, scheduler).await {
                    error!("Failed to execute batch reports send job: {err:?}");
                }
            })
        })?)
    }

    /// Executes a `BatchReportsSend` job.
    async fn execute<ET: EmailTransport>(
        api: Arc<Api<ET>>,
        _: JobScheduler,
    ) -> anyhow::Result<()> {
        let execute_start = Instant::now();
        match api.batches().report_open_batches(MAX_BATCHES_TO_REPORT).await {
            Ok(reported_batch_count) => {
                info!(
                    "Reported {} open batches ({} elapsed).",
                    reported_batch_count,
                    humantime::format_duration(execute_start.elapsed())
                );
            }
            Err(err) => {
                error!(
                    "Failed to report open batches ({} elapsed): {:?}",
                    humantime::format_duration(execute_start.elapsed()),
                    err
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::BatchReportsSendJob;
    use crate::{
        api::Api,
        batches::{BatchReportTrigger, BatchStore, MemoryBatchStore},
        mailer::Mailer,
        tests::{MockReporter, mock_api_with_config, mock_batch, mock_config},
    };
    use lettre::transport::stub::AsyncStubTransport;
    use std::{sync::Arc, time::Duration};
    use tokio_cron_scheduler::JobScheduler;

    #[tokio::test]
    async fn fails_with_invalid_schedule() -> anyhow::Result<()> {
        let mut config = mock_config();
        config.jobs.batch_reports = "61 */10 * * * *".to_string();

        assert!(BatchReportsSendJob::create(mock_api_with_config(config)?).is_err());

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn reports_open_batches() -> anyhow::Result<()> {
        let mut config = mock_config();
        config.jobs.batch_reports = "* * * * * *".to_string();

        let store = Arc::new(MemoryBatchStore::default());
        store.insert_batch(&mock_batch(2)?).await?;

        let reporter = Arc::new(MockReporter::default());
        let api = Arc::new(Api::new(
            config.clone(),
            Mailer::new(AsyncStubTransport::new_ok(), &config.smtp)?,
            store,
            reporter.clone(),
        ));

        let mut scheduler = JobScheduler::new().await?;
        scheduler.add(BatchReportsSendJob::create(api)?).await?;
        scheduler.start().await?;

        // The job ticks every second.
        while reporter.reports().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        scheduler.shutdown().await?;

        let reports = reporter.reports();
        assert_eq!(reports[0].trigger, BatchReportTrigger::Progress);
        assert_eq!(reports[0].batch, mock_batch(2)?);

        Ok(())
    }
}
