use crate::{
    api::Api,
    batches::{
        Batch, BatchId, BatchReport, BatchSubmission, DispatchRequest, Recipients, SendRecord,
    },
    error::Error as BatchmailError,
    mailer::{DeliveryError, Email, EmailBody, EmailTransport},
    recipients::extract_recipients,
};
use anyhow::bail;
use std::{collections::HashSet, sync::Arc, time::Duration};
use time::OffsetDateTime;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Defines how many times the outcome of a single email is offered to the store.
const MAX_RECORD_ATTEMPTS: u32 = 3;

/// Defines the delay before the first retry of a failed outcome write, doubled for every next one.
const RECORD_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Defines how many open batches are resolved at once during startup.
const MAX_INTERRUPTED_BATCHES_PAGE: usize = 100;

/// Describes the API to work with email batches.
pub struct BatchesApi<'a, ET: EmailTransport> {
    api: &'a Arc<Api<ET>>,
}

impl<'a, ET: EmailTransport> BatchesApi<'a, ET> {
    /// Creates Batches API.
    pub fn new(api: &'a Arc<Api<ET>>) -> Self {
        Self { api }
    }

    /// Accepts a dispatch request: resolves recipients, issues a batch and starts dispatching
    /// emails in the background. Returns as soon as the batch is created.
    pub async fn submit(
        &self,
        request: DispatchRequest,
    ) -> Result<BatchSubmission, BatchmailError> {
        let recipients = match request.recipients {
            Recipients::List(recipients) => recipients,
            Recipients::Csv { data, column } => extract_recipients(&data, &column)
                .await
                .map_err(|err| BatchmailError::client_with_root_cause(err.into()))?,
        };

        if recipients.iter().all(|recipient| recipient.trim().is_empty()) {
            return Err(BatchmailError::client("Recipient list is empty."));
        }

        let batch = Batch::new(
            BatchId::new(),
            self.api.mailer.sender_address(),
            recipients.len(),
            OffsetDateTime::now_utc(),
        );
        self.api.store.insert_batch(&batch).await?;

        info!(
            batch.id = %batch.id,
            batch.email_count = batch.email_count,
            "Accepted batch {} with {} emails.",
            batch.id,
            batch.email_count
        );

        // Batches outlive the HTTP worker that accepted them.
        let handle = self.api.batch_tasks.spawn_on(
            dispatch(
                self.api.clone(),
                batch.id,
                recipients,
                request.subject,
                request.body,
            ),
            &self.api.runtime,
        );

        Ok(BatchSubmission::new(batch.id, handle))
    }

    /// Retrieves batch by its ID.
    pub async fn get_batch(&self, id: BatchId) -> anyhow::Result<Option<Batch>> {
        self.api.store.get_batch(id).await
    }

    /// Retrieves send records of the batch, optionally filtered by the recipient address. Returns
    /// `None` if the batch doesn't exist.
    pub async fn get_send_records(
        &self,
        id: BatchId,
        email: Option<&str>,
    ) -> anyhow::Result<Option<Vec<SendRecord>>> {
        if self.api.store.get_batch(id).await?.is_none() {
            return Ok(None);
        }

        self.api.store.get_send_records(id, email).await.map(Some)
    }

    /// Removes closed batch together with its send records.
    pub async fn remove_batch(&self, id: BatchId) -> Result<(), BatchmailError> {
        let Some(batch) = self.api.store.get_batch(id).await? else {
            return Err(BatchmailError::not_found(format!(
                "Batch `{id}` is not found."
            )));
        };

        if !batch.is_closed() {
            return Err(BatchmailError::client(format!(
                "Batch `{id}` is still in progress and cannot be removed."
            )));
        }

        self.api.store.remove_batch(id).await?;
        debug!(batch.id = %id, "Removed batch {id}.");

        Ok(())
    }

    /// Reports progress of up to `limit` open batches. Returns the number of reported batches.
    pub async fn report_open_batches(&self, limit: usize) -> anyhow::Result<usize> {
        let open_batches = self.api.store.get_open_batches(limit).await?;

        let mut reported_batches = 0;
        for batch in open_batches {
            let batch_id = batch.id;
            match self.api.reporter.report(&BatchReport::progress(batch)).await {
                Ok(_) => reported_batches += 1,
                Err(err) => {
                    error!(
                        batch.id = %batch_id,
                        "Failed to report batch {batch_id} progress: {err:?}"
                    );
                }
            }
        }

        Ok(reported_batches)
    }

    /// Closes batches left open by a previous process: emails without a recorded outcome are
    /// accounted as failed. Must be called before any batch is submitted. Returns the number of
    /// resolved batches.
    pub async fn resolve_interrupted_batches(&self) -> anyhow::Result<usize> {
        let mut resolved_batches = 0;
        loop {
            let open_batches = self
                .api
                .store
                .get_open_batches(MAX_INTERRUPTED_BATCHES_PAGE)
                .await?;
            if open_batches.is_empty() {
                return Ok(resolved_batches);
            }

            for batch in open_batches {
                let batch = fail_unresolved_emails::<ET>(self.api, batch).await?;
                warn!(
                    batch.id = %batch.id,
                    batch.fail_count = batch.fail_count,
                    "Resolved interrupted batch {}: {} sent, {} failed.",
                    batch.id,
                    batch.success_count,
                    batch.fail_count
                );

                if let Err(err) = self
                    .api
                    .reporter
                    .report(&BatchReport::completion(batch.clone()))
                    .await
                {
                    error!(
                        batch.id = %batch.id,
                        "Failed to report batch {} completion: {err:?}",
                        batch.id
                    );
                }

                resolved_batches += 1;
            }
        }
    }

    /// Stops accepting new batches and waits until all in-flight batches are dispatched.
    pub async fn shutdown(&self) {
        self.api.batch_tasks.close();
        self.api.batch_tasks.wait().await;
    }
}

/// Dispatches an email to every recipient concurrently and reports the batch completion.
async fn dispatch<ET: EmailTransport>(
    api: Arc<Api<ET>>,
    batch_id: BatchId,
    recipients: Vec<String>,
    subject: String,
    body: EmailBody,
) -> anyhow::Result<Batch> {
    let mut sends = JoinSet::new();
    for (position, recipient) in recipients.into_iter().enumerate() {
        let email = Email::new(recipient, subject.clone(), body.clone());
        sends.spawn(send_one(api.clone(), batch_id, position, email));
    }

    let mut closed_batch = None;
    let mut unrecorded_emails = 0;
    while let Some(result) = sends.join_next().await {
        match result {
            Ok(Ok(batch)) if batch.is_closed() => closed_batch = Some(batch),
            Ok(Ok(_)) => {}
            Ok(Err(err)) => {
                unrecorded_emails += 1;
                error!(
                    batch.id = %batch_id,
                    "Failed to record email outcome for batch {batch_id}: {err:?}"
                );
            }
            Err(err) => {
                unrecorded_emails += 1;
                error!(
                    batch.id = %batch_id,
                    "Email task of batch {batch_id} failed: {err:?}"
                );
            }
        }
    }

    let Some(batch) = closed_batch else {
        bail!(
            "Batch `{batch_id}` is left open, {unrecorded_emails} outcomes weren't recorded."
        );
    };

    info!(
        batch.id = %batch.id,
        batch.success_count = batch.success_count,
        batch.fail_count = batch.fail_count,
        "Batch {} is completed: {} sent, {} failed.",
        batch.id,
        batch.success_count,
        batch.fail_count
    );

    if let Err(err) = api
        .reporter
        .report(&BatchReport::completion(batch.clone()))
        .await
    {
        error!(
            batch.id = %batch.id,
            "Failed to report batch {} completion: {err:?}",
            batch.id
        );
    }

    Ok(batch)
}

/// Sends a single email of the batch and records its outcome.
async fn send_one<ET: EmailTransport>(
    api: Arc<Api<ET>>,
    batch_id: BatchId,
    position: usize,
    email: Email,
) -> anyhow::Result<Batch> {
    let record = match api.mailer.send(&email).await {
        Ok(_) => SendRecord::delivered(batch_id, position, email.to, OffsetDateTime::now_utc()),
        Err(err) => {
            warn!(
                batch.id = %batch_id,
                email.position = position,
                "Failed to send email #{position} of batch {batch_id}: {err}"
            );
            SendRecord::failed(batch_id, position, email.to, OffsetDateTime::now_utc(), &err)
        }
    };

    let mut attempt = 1;
    loop {
        match api.store.record_send(&record).await {
            Ok(batch) => return Ok(batch),
            Err(err) if attempt < MAX_RECORD_ATTEMPTS => {
                warn!(
                    batch.id = %batch_id,
                    email.position = position,
                    "Retrying to record email #{position} of batch {batch_id}: {err:?}"
                );
                tokio::time::sleep(RECORD_RETRY_DELAY * 2u32.pow(attempt - 1)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Accounts every email of the open batch that doesn't have a recorded outcome as failed, which
/// closes the batch.
async fn fail_unresolved_emails<ET: EmailTransport>(
    api: &Api<ET>,
    mut batch: Batch,
) -> anyhow::Result<Batch> {
    let resolved_positions = api
        .store
        .get_send_records(batch.id, None)
        .await?
        .into_iter()
        .map(|record| record.position)
        .collect::<HashSet<_>>();

    let error = DeliveryError::Transport("Dispatch was interrupted.".to_string());
    for position in 0..batch.email_count {
        if batch.is_closed() {
            break;
        }

        if !resolved_positions.contains(&position) {
            // Recipient addresses aren't stored until their outcome is known.
            batch = api
                .store
                .record_send(&SendRecord::failed(
                    batch.id,
                    position,
                    "",
                    OffsetDateTime::now_utc(),
                    &error,
                ))
                .await?;
        }
    }

    if !batch.is_closed() {
        bail!(
            "Batch `{}` cannot be closed: {} of {} emails are resolved.",
            batch.id,
            batch.resolved_count(),
            batch.email_count
        );
    }

    Ok(batch)
}

impl<ET: EmailTransport> Api<ET> {
    /// Returns an API to work with email batches.
    pub fn batches(self: &Arc<Self>) -> BatchesApi<'_, ET> {
        BatchesApi::new(self)
    }
}
