use crate::batches::SendRecord;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(FromRow, Debug, Eq, PartialEq, Clone)]
pub(super) struct RawSendRecord {
    pub batch_id: Uuid,
    pub position: i64,
    pub email: String,
    pub is_sent: i64,
    pub sent_at: i64,
    pub log: Option<String>,
}

impl TryFrom<RawSendRecord> for SendRecord {
    type Error = anyhow::Error;

    fn try_from(raw_record: RawSendRecord) -> Result<Self, Self::Error> {
        Ok(SendRecord {
            batch_id: raw_record.batch_id.into(),
            position: raw_record.position.try_into()?,
            email: raw_record.email,
            is_sent: raw_record.is_sent > 0,
            sent_at: OffsetDateTime::from_unix_timestamp(raw_record.sent_at)?,
            log: raw_record.log,
        })
    }
}

impl TryFrom<&SendRecord> for RawSendRecord {
    type Error = anyhow::Error;

    fn try_from(record: &SendRecord) -> Result<Self, Self::Error> {
        Ok(RawSendRecord {
            batch_id: *record.batch_id,
            position: record.position.try_into()?,
            email: record.email.clone(),
            is_sent: i64::from(record.is_sent),
            sent_at: record.sent_at.unix_timestamp(),
            log: record.log.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RawSendRecord;
    use crate::batches::SendRecord;
    use time::OffsetDateTime;
    use uuid::uuid;

    #[test]
    fn can_convert_to_send_record() -> anyhow::Result<()> {
        assert_eq!(
            SendRecord::try_from(RawSendRecord {
                batch_id: uuid!("00000000-0000-0000-0000-000000000001"),
                position: 1,
                email: "b@x".to_string(),
                is_sent: 0,
                sent_at: 946720800,
                log: Some("Recipient rejected: bad address".to_string()),
            })?,
            SendRecord {
                batch_id: uuid!("00000000-0000-0000-0000-000000000001").into(),
                position: 1,
                email: "b@x".to_string(),
                is_sent: false,
                sent_at: OffsetDateTime::from_unix_timestamp(946720800)?,
                log: Some("Recipient rejected: bad address".to_string()),
            }
        );

        Ok(())
    }

    #[test]
    fn can_convert_from_send_record() -> anyhow::Result<()> {
        assert_eq!(
            RawSendRecord::try_from(&SendRecord::delivered(
                uuid!("00000000-0000-0000-0000-000000000001").into(),
                0,
                "a@x.com",
                OffsetDateTime::from_unix_timestamp(946720800)?
            ))?,
            RawSendRecord {
                batch_id: uuid!("00000000-0000-0000-0000-000000000001"),
                position: 0,
                email: "a@x.com".to_string(),
                is_sent: 1,
                sent_at: 946720800,
                log: None,
            }
        );

        Ok(())
    }
}
