use crate::{batches::BatchId, mailer::DeliveryError};
use serde::Serialize;
use time::OffsetDateTime;

/// Terminal outcome of a single email of the batch.
#[derive(Serialize, Debug, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SendRecord {
    /// ID of the batch the email belongs to.
    pub batch_id: BatchId,
    /// Zero-based index of the recipient in the batch recipient list.
    pub position: usize,
    /// Recipient address as it was supplied.
    pub email: String,
    /// Indicates whether the email was accepted by the relay.
    pub is_sent: bool,
    /// Date when the outcome was resolved.
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
    /// Failure detail, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
}

impl SendRecord {
    /// Creates a record for the email that was accepted by the relay.
    pub fn delivered(
        batch_id: BatchId,
        position: usize,
        email: impl Into<String>,
        sent_at: OffsetDateTime,
    ) -> Self {
        Self {
            batch_id,
            position,
            email: email.into(),
            is_sent: true,
            sent_at,
            log: None,
        }
    }

    /// Creates a record for the email that couldn't be delivered.
    pub fn failed(
        batch_id: BatchId,
        position: usize,
        email: impl Into<String>,
        sent_at: OffsetDateTime,
        error: &DeliveryError,
    ) -> Self {
        Self {
            batch_id,
            position,
            email: email.into(),
            is_sent: false,
            sent_at,
            log: Some(error.to_string()),
        }
    }
}
