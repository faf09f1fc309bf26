use crate::{
    batches::{BatchReporter, BatchStore},
    config::Config,
    mailer::{EmailTransport, Mailer},
};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;

/// Collection of the service dependencies shared by all APIs.
pub struct Api<ET: EmailTransport> {
    pub config: Config,
    pub mailer: Mailer<ET>,
    pub store: Arc<dyn BatchStore>,
    pub reporter: Arc<dyn BatchReporter>,
    pub(crate) batch_tasks: TaskTracker,
    pub(crate) runtime: Handle,
}

impl<ET: EmailTransport> Api<ET> {
    /// Instantiates APIs collection with the specified config and dependencies. Background batch
    /// tasks are spawned on the runtime the APIs collection is created in.
    pub fn new(
        config: Config,
        mailer: Mailer<ET>,
        store: Arc<dyn BatchStore>,
        reporter: Arc<dyn BatchReporter>,
    ) -> Self {
        Self {
            config,
            mailer,
            store,
            reporter,
            batch_tasks: TaskTracker::new(),
            runtime: Handle::current(),
        }
    }
}

impl<ET: EmailTransport> AsRef<Config> for Api<ET> {
    fn as_ref(&self) -> &Config {
        &self.config
    }
}
