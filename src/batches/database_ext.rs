mod raw_batch;
mod raw_send_record;

use crate::{
    batches::{
        Batch, BatchId, BatchStore, SendRecord,
        database_ext::{raw_batch::RawBatch, raw_send_record::RawSendRecord},
    },
    database::Database,
};
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use sqlx::{query, query_as};

/// Extends the database with the batch-related methods.
#[async_trait]
impl BatchStore for Database {
    async fn insert_batch(&self, batch: &Batch) -> anyhow::Result<()> {
        batch.validate()?;

        let raw_batch = RawBatch::try_from(batch)?;
        query(
            r#"INSERT INTO batches (id, sender, email_count, success_count, fail_count, start_at, finish_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
        )
        .bind(raw_batch.id)
        .bind(raw_batch.sender)
        .bind(raw_batch.email_count)
        .bind(raw_batch.success_count)
        .bind(raw_batch.fail_count)
        .bind(raw_batch.start_at)
        .bind(raw_batch.finish_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_batch(&self, id: BatchId) -> anyhow::Result<Option<Batch>> {
        query_as::<_, RawBatch>(r#"SELECT * FROM batches WHERE id = ?1"#)
            .bind(*id)
            .fetch_optional(&self.pool)
            .await?
            .map(Batch::try_from)
            .transpose()
    }

    async fn update_batch(&self, batch: &Batch) -> anyhow::Result<()> {
        batch.validate()?;

        let raw_batch = RawBatch::try_from(batch)?;
        let result = query(
            r#"UPDATE batches
               SET sender = ?2, email_count = ?3, success_count = ?4, fail_count = ?5, start_at = ?6, finish_at = ?7
               WHERE id = ?1 AND finish_at IS NULL"#,
        )
        .bind(raw_batch.id)
        .bind(raw_batch.sender)
        .bind(raw_batch.email_count)
        .bind(raw_batch.success_count)
        .bind(raw_batch.fail_count)
        .bind(raw_batch.start_at)
        .bind(raw_batch.finish_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            match self.get_batch(batch.id).await? {
                Some(_) => bail!("Batch `{}` is already closed.", batch.id),
                None => bail!("Batch `{}` is not found.", batch.id),
            }
        }

        Ok(())
    }

    async fn remove_batch(&self, id: BatchId) -> anyhow::Result<()> {
        let mut transaction = self.pool.begin().await?;
        query(r#"DELETE FROM send_records WHERE batch_id = ?1"#)
            .bind(*id)
            .execute(&mut *transaction)
            .await?;
        query(r#"DELETE FROM batches WHERE id = ?1"#)
            .bind(*id)
            .execute(&mut *transaction)
            .await?;

        Ok(transaction.commit().await?)
    }

    async fn get_open_batches(&self, limit: usize) -> anyhow::Result<Vec<Batch>> {
        query_as::<_, RawBatch>(
            r#"SELECT * FROM batches WHERE finish_at IS NULL ORDER BY start_at, id LIMIT ?1"#,
        )
        .bind(i64::try_from(limit)?)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Batch::try_from)
        .collect()
    }

    async fn record_send(&self, record: &SendRecord) -> anyhow::Result<Batch> {
        let raw_record = RawSendRecord::try_from(record)?;

        // The counter update goes first so that the transaction takes the write lock right away.
        let mut transaction = self.pool.begin().await?;
        let raw_batch = query_as::<_, RawBatch>(
            r#"UPDATE batches
               SET success_count = success_count + ?2,
                   fail_count = fail_count + ?3,
                   finish_at = CASE WHEN success_count + fail_count + 1 = email_count THEN ?4 ELSE NULL END
               WHERE id = ?1 AND finish_at IS NULL AND success_count + fail_count < email_count AND ?5 < email_count
               RETURNING *"#,
        )
        .bind(raw_record.batch_id)
        .bind(raw_record.is_sent)
        .bind(1 - raw_record.is_sent)
        .bind(raw_record.sent_at)
        .bind(raw_record.position)
        .fetch_optional(&mut *transaction)
        .await?;

        let Some(raw_batch) = raw_batch else {
            transaction.rollback().await?;
            return Err(match self.get_batch(record.batch_id).await? {
                Some(batch) if batch.is_closed() => {
                    anyhow!("Batch `{}` is already closed.", batch.id)
                }
                Some(batch) => anyhow!(
                    "Batch `{}` doesn't have a recipient at position {}.",
                    batch.id,
                    record.position
                ),
                None => anyhow!("Batch `{}` is not found.", record.batch_id),
            });
        };

        query(
            r#"INSERT INTO send_records (batch_id, position, email, is_sent, sent_at, log)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        )
        .bind(raw_record.batch_id)
        .bind(raw_record.position)
        .bind(raw_record.email)
        .bind(raw_record.is_sent)
        .bind(raw_record.sent_at)
        .bind(raw_record.log)
        .execute(&mut *transaction)
        .await
        .map_err(|err| {
            anyhow!(
                "Recipient at position {} of the batch `{}` cannot be recorded: {err}",
                record.position,
                record.batch_id
            )
        })?;

        transaction.commit().await?;

        Batch::try_from(raw_batch)
    }

    async fn get_send_records(
        &self,
        batch_id: BatchId,
        email: Option<&str>,
    ) -> anyhow::Result<Vec<SendRecord>> {
        query_as::<_, RawSendRecord>(
            r#"SELECT * FROM send_records WHERE batch_id = ?1 AND (?2 IS NULL OR email = ?2) ORDER BY position"#,
        )
        .bind(*batch_id)
        .bind(email)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(SendRecord::try_from)
        .collect()
    }

    async fn update_send_record(&self, record: &SendRecord) -> anyhow::Result<()> {
        let raw_record = RawSendRecord::try_from(record)?;
        let result = query(
            r#"UPDATE send_records SET email = ?3, is_sent = ?4, sent_at = ?5, log = ?6
               WHERE batch_id = ?1 AND position = ?2"#,
        )
        .bind(raw_record.batch_id)
        .bind(raw_record.position)
        .bind(raw_record.email)
        .bind(raw_record.is_sent)
        .bind(raw_record.sent_at)
        .bind(raw_record.log)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            bail!(
                "Send record at position {} of the batch `{}` is not found.",
                record.position,
                record.batch_id
            );
        }

        Ok(())
    }

    async fn remove_send_record(&self, batch_id: BatchId, position: usize) -> anyhow::Result<()> {
        query(r#"DELETE FROM send_records WHERE batch_id = ?1 AND position = ?2"#)
            .bind(*batch_id)
            .bind(i64::try_from(position)?)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
