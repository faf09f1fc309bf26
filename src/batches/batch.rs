use crate::batches::{BatchId, BatchStatus};
use anyhow::bail;
use serde::Serialize;
use time::OffsetDateTime;

/// Defines a batch of emails dispatched for a single request.
#[derive(Serialize, Debug, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    /// Unique batch id (UUIDv7).
    pub id: BatchId,
    /// Address the emails are sent from.
    #[serde(rename = "from")]
    pub sender: String,
    /// Total number of recipients in the batch.
    pub email_count: usize,
    /// Number of the emails that were delivered to the relay.
    pub success_count: usize,
    /// Number of the emails that failed.
    pub fail_count: usize,
    /// Date when the batch was accepted.
    #[serde(with = "time::serde::rfc3339")]
    pub start_at: OffsetDateTime,
    /// Date when the last email of the batch was resolved.
    #[serde(with = "time::serde::rfc3339::option")]
    pub finish_at: Option<OffsetDateTime>,
}

impl Batch {
    /// Creates a new open batch with zero counters.
    pub fn new(id: BatchId, sender: String, email_count: usize, start_at: OffsetDateTime) -> Self {
        Self {
            id,
            sender,
            email_count,
            success_count: 0,
            fail_count: 0,
            start_at,
            finish_at: None,
        }
    }

    /// Number of the emails with a terminal outcome.
    pub fn resolved_count(&self) -> usize {
        self.success_count + self.fail_count
    }

    pub fn is_closed(&self) -> bool {
        self.finish_at.is_some()
    }

    pub fn status(&self) -> BatchStatus {
        if self.is_closed() {
            BatchStatus::Closed
        } else {
            BatchStatus::Open
        }
    }

    /// Checks that the counters never exceed the number of recipients and that the batch is closed
    /// exactly when every email is resolved.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.resolved_count() > self.email_count {
            bail!(
                "Batch `{}` has {} resolved emails, but only {} recipients.",
                self.id,
                self.resolved_count(),
                self.email_count
            );
        }

        if self.is_closed() != (self.resolved_count() == self.email_count) {
            bail!(
                "Batch `{}` must be closed exactly when all its emails are resolved.",
                self.id
            );
        }

        Ok(())
    }

    /// Accounts the outcome of a single email, closing the batch with the last one.
    pub fn apply(&mut self, is_sent: bool, resolved_at: OffsetDateTime) -> anyhow::Result<()> {
        if self.is_closed() {
            bail!("Batch `{}` is already closed.", self.id);
        }

        if self.resolved_count() >= self.email_count {
            bail!("Batch `{}` doesn't expect more emails.", self.id);
        }

        if is_sent {
            self.success_count += 1;
        } else {
            self.fail_count += 1;
        }

        if self.resolved_count() == self.email_count {
            self.finish_at = Some(resolved_at);
        }

        Ok(())
    }
}
