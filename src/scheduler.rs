mod scheduler_jobs;

use crate::{api::Api, mailer::EmailTransport, scheduler::scheduler_jobs::BatchReportsSendJob};
use std::sync::Arc;
use tokio_cron_scheduler::JobScheduler;
use tracing::debug;

/// The scheduler is responsible for scheduling and executing Batchmail jobs.
pub struct Scheduler {
    inner_scheduler: JobScheduler,
}

impl Scheduler {
    /// Starts the scheduler with all periodic jobs.
    pub async fn start<ET: EmailTransport>(api: Arc<Api<ET>>) -> anyhow::Result<Self> {
        let mut scheduler = Self {
            inner_scheduler: JobScheduler::new().await?,
        };

        let job_id = scheduler
            .inner_scheduler
            .add(BatchReportsSendJob::create(api)?)
            .await?;
        debug!("Scheduled batch reports send job: {job_id}.");

        scheduler.inner_scheduler.start().await?;
        Ok(scheduler)
    }

    /// Stops all scheduled jobs.
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.inner_scheduler.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        scheduler::Scheduler,
        tests::{mock_api_with_config, mock_config},
    };

    #[tokio::test]
    async fn can_start_and_shutdown() -> anyhow::Result<()> {
        let mut scheduler = Scheduler::start(mock_api_with_config(mock_config())?).await?;
        scheduler.shutdown().await?;

        Ok(())
    }

    #[tokio::test]
    async fn fails_to_start_with_invalid_schedule() -> anyhow::Result<()> {
        let mut config = mock_config();
        config.jobs.batch_reports = "61 */10 * * * *".to_string();

        assert!(Scheduler::start(mock_api_with_config(config)?).await.is_err());

        Ok(())
    }
}
