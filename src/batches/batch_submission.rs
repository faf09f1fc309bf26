use crate::batches::{Batch, BatchId};
use tokio::task::JoinHandle;

/// Handle of the accepted batch. The batch is dispatched in the background, and the handle can
/// be used to wait until every recipient has a terminal outcome.
#[derive(Debug)]
pub struct BatchSubmission {
    pub batch_id: BatchId,
    handle: JoinHandle<anyhow::Result<Batch>>,
}

impl BatchSubmission {
    pub(super) fn new(batch_id: BatchId, handle: JoinHandle<anyhow::Result<Batch>>) -> Self {
        Self { batch_id, handle }
    }

    /// Waits for the batch dispatch to finish and returns the final state of the batch.
    pub async fn wait(self) -> anyhow::Result<Batch> {
        self.handle.await?
    }
}
