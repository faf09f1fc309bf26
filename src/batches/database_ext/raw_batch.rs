use crate::batches::Batch;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(FromRow, Debug, Eq, PartialEq, Clone)]
pub(super) struct RawBatch {
    pub id: Uuid,
    pub sender: String,
    pub email_count: i64,
    pub success_count: i64,
    pub fail_count: i64,
    pub start_at: i64,
    pub finish_at: Option<i64>,
}

impl TryFrom<RawBatch> for Batch {
    type Error = anyhow::Error;

    fn try_from(raw_batch: RawBatch) -> Result<Self, Self::Error> {
        Ok(Batch {
            id: raw_batch.id.into(),
            sender: raw_batch.sender,
            email_count: raw_batch.email_count.try_into()?,
            success_count: raw_batch.success_count.try_into()?,
            fail_count: raw_batch.fail_count.try_into()?,
            start_at: OffsetDateTime::from_unix_timestamp(raw_batch.start_at)?,
            finish_at: raw_batch
                .finish_at
                .map(OffsetDateTime::from_unix_timestamp)
                .transpose()?,
        })
    }
}

impl TryFrom<&Batch> for RawBatch {
    type Error = anyhow::Error;

    fn try_from(batch: &Batch) -> Result<Self, Self::Error> {
        Ok(RawBatch {
            id: *batch.id,
            sender: batch.sender.clone(),
            email_count: batch.email_count.try_into()?,
            success_count: batch.success_count.try_into()?,
            fail_count: batch.fail_count.try_into()?,
            start_at: batch.start_at.unix_timestamp(),
            finish_at: batch.finish_at.map(|finish_at| finish_at.unix_timestamp()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RawBatch;
    use crate::{batches::Batch, tests::mock_batch};
    use time::OffsetDateTime;
    use uuid::uuid;

    #[test]
    fn can_convert_to_batch() -> anyhow::Result<()> {
        assert_eq!(
            Batch::try_from(RawBatch {
                id: uuid!("00000000-0000-0000-0000-000000000001"),
                sender: "dev@batchmail.dev".to_string(),
                email_count: 3,
                success_count: 2,
                fail_count: 1,
                start_at: 946720800,
                finish_at: Some(946720810),
            })?,
            Batch {
                success_count: 2,
                fail_count: 1,
                finish_at: Some(OffsetDateTime::from_unix_timestamp(946720810)?),
                ..mock_batch(3)?
            }
        );

        assert!(
            Batch::try_from(RawBatch {
                id: uuid!("00000000-0000-0000-0000-000000000001"),
                sender: "dev@batchmail.dev".to_string(),
                email_count: -1,
                success_count: 0,
                fail_count: 0,
                start_at: 946720800,
                finish_at: None,
            })
            .is_err()
        );

        Ok(())
    }

    #[test]
    fn can_convert_from_batch() -> anyhow::Result<()> {
        assert_eq!(
            RawBatch::try_from(&mock_batch(3)?)?,
            RawBatch {
                id: uuid!("00000000-0000-0000-0000-000000000001"),
                sender: "dev@batchmail.dev".to_string(),
                email_count: 3,
                success_count: 0,
                fail_count: 0,
                start_at: 946720800,
                finish_at: None,
            }
        );

        Ok(())
    }
}
