use crate::batches::{Batch, BatchId, BatchStore, SendRecord};
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, MutexGuard},
};

#[derive(Default)]
struct MemoryBatchStoreState {
    batches: HashMap<BatchId, Batch>,
    send_records: HashMap<BatchId, BTreeMap<usize, SendRecord>>,
}

/// Batch store that keeps everything in memory. All operations are serialized with a single lock,
/// so counter updates never interleave.
#[derive(Default)]
pub struct MemoryBatchStore {
    state: Mutex<MemoryBatchStoreState>,
}

impl MemoryBatchStore {
    fn state(&self) -> anyhow::Result<MutexGuard<'_, MemoryBatchStoreState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("Batch store lock is poisoned."))
    }
}

#[async_trait]
impl BatchStore for MemoryBatchStore {
    async fn insert_batch(&self, batch: &Batch) -> anyhow::Result<()> {
        batch.validate()?;

        let mut state = self.state()?;
        if state.batches.contains_key(&batch.id) {
            bail!("Batch `{}` already exists.", batch.id);
        }

        state.batches.insert(batch.id, batch.clone());
        Ok(())
    }

    async fn get_batch(&self, id: BatchId) -> anyhow::Result<Option<Batch>> {
        Ok(self.state()?.batches.get(&id).cloned())
    }

    async fn update_batch(&self, batch: &Batch) -> anyhow::Result<()> {
        batch.validate()?;

        let mut state = self.state()?;
        match state.batches.get_mut(&batch.id) {
            Some(stored_batch) if stored_batch.is_closed() => {
                bail!("Batch `{}` is already closed.", batch.id)
            }
            Some(stored_batch) => {
                *stored_batch = batch.clone();
                Ok(())
            }
            None => bail!("Batch `{}` is not found.", batch.id),
        }
    }

    async fn remove_batch(&self, id: BatchId) -> anyhow::Result<()> {
        let mut state = self.state()?;
        state.batches.remove(&id);
        state.send_records.remove(&id);
        Ok(())
    }

    async fn get_open_batches(&self, limit: usize) -> anyhow::Result<Vec<Batch>> {
        let state = self.state()?;
        let mut batches = state
            .batches
            .values()
            .filter(|batch| !batch.is_closed())
            .cloned()
            .collect::<Vec<_>>();
        batches.sort_by_key(|batch| (batch.start_at, batch.id));
        batches.truncate(limit);
        Ok(batches)
    }

    async fn record_send(&self, record: &SendRecord) -> anyhow::Result<Batch> {
        let mut state = self.state()?;
        let state = &mut *state;

        let batch = state
            .batches
            .get_mut(&record.batch_id)
            .ok_or_else(|| anyhow!("Batch `{}` is not found.", record.batch_id))?;
        if record.position >= batch.email_count {
            bail!(
                "Batch `{}` doesn't have a recipient at position {}.",
                batch.id,
                record.position
            );
        }

        let records = state.send_records.entry(record.batch_id).or_default();
        if records.contains_key(&record.position) {
            bail!(
                "Recipient at position {} of the batch `{}` is already resolved.",
                record.position,
                batch.id
            );
        }

        batch.apply(record.is_sent, record.sent_at)?;
        records.insert(record.position, record.clone());

        Ok(batch.clone())
    }

    async fn get_send_records(
        &self,
        batch_id: BatchId,
        email: Option<&str>,
    ) -> anyhow::Result<Vec<SendRecord>> {
        let state = self.state()?;
        Ok(state
            .send_records
            .get(&batch_id)
            .map(|records| {
                records
                    .values()
                    .filter(|record| email.is_none_or(|email| record.email == email))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_send_record(&self, record: &SendRecord) -> anyhow::Result<()> {
        let mut state = self.state()?;
        match state
            .send_records
            .get_mut(&record.batch_id)
            .and_then(|records| records.get_mut(&record.position))
        {
            Some(stored_record) => {
                *stored_record = record.clone();
                Ok(())
            }
            None => bail!(
                "Send record at position {} of the batch `{}` is not found.",
                record.position,
                record.batch_id
            ),
        }
    }

    async fn remove_send_record(&self, batch_id: BatchId, position: usize) -> anyhow::Result<()> {
        let mut state = self.state()?;
        if let Some(records) = state.send_records.get_mut(&batch_id) {
            records.remove(&position);
        }
        Ok(())
    }
}
