use crate::batches::{Batch, BatchId, SendRecord};
use async_trait::async_trait;

/// Storage for batches and their send records.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Inserts a new batch. Fails if the batch with the same ID already exists.
    async fn insert_batch(&self, batch: &Batch) -> anyhow::Result<()>;

    /// Retrieves batch by its ID.
    async fn get_batch(&self, id: BatchId) -> anyhow::Result<Option<Batch>>;

    /// Replaces the stored open batch. Fails if the batch doesn't exist or is already closed, and
    /// rejects counters that are inconsistent with the number of recipients.
    async fn update_batch(&self, batch: &Batch) -> anyhow::Result<()>;

    /// Removes batch together with all its send records.
    async fn remove_batch(&self, id: BatchId) -> anyhow::Result<()>;

    /// Retrieves up to `limit` batches that aren't closed yet, oldest first.
    async fn get_open_batches(&self, limit: usize) -> anyhow::Result<Vec<Batch>>;

    /// Atomically stores the send record and accounts its outcome in the batch counters, closing
    /// the batch once every recipient is resolved. Returns the updated batch.
    async fn record_send(&self, record: &SendRecord) -> anyhow::Result<Batch>;

    /// Retrieves send records of the batch ordered by position, optionally filtered by recipient.
    async fn get_send_records(
        &self,
        batch_id: BatchId,
        email: Option<&str>,
    ) -> anyhow::Result<Vec<SendRecord>>;

    /// Replaces the stored send record with the same batch ID and position.
    async fn update_send_record(&self, record: &SendRecord) -> anyhow::Result<()>;

    /// Removes send record of the batch at the given position.
    async fn remove_send_record(&self, batch_id: BatchId, position: usize) -> anyhow::Result<()>;
}
