use crate::{
    batches::{DispatchRequest, Recipients},
    error::Error as BatchmailError,
    mailer::{EmailBody, EmailTransport},
    server::app_state::AppState,
};
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures::StreamExt;
use serde_json::json;
use tracing::info;

/// Defines a maximum size of the uploaded CSV file (10 MiB).
const MAX_CSV_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Defines a maximum size of the text form field.
const MAX_TEXT_FIELD_SIZE: usize = 1024 * 1024;

#[derive(Default)]
struct EmailSendCsvParams {
    file: Option<Vec<u8>>,
    subject: Option<String>,
    body: Option<String>,
    template: Option<String>,
    target_column: Option<String>,
}

/// Accepts a batch of emails addressed to the recipients listed in the uploaded CSV file.
pub async fn email_send_csv<ET: EmailTransport>(
    state: web::Data<AppState<ET>>,
    payload: Multipart,
) -> Result<HttpResponse, BatchmailError> {
    let params = read_params(payload).await?;

    let subject = params
        .subject
        .filter(|subject| !subject.trim().is_empty())
        .ok_or_else(|| BatchmailError::client("Subject is required."))?;
    let column = params
        .target_column
        .filter(|column| !column.is_empty())
        .ok_or_else(|| BatchmailError::client("Target column is required."))?;
    let data = params
        .file
        .ok_or_else(|| BatchmailError::client("CSV file is required."))?;

    let submission = state
        .api
        .batches()
        .submit(DispatchRequest::new(
            Recipients::Csv { data, column },
            subject,
            EmailBody::new(params.body, params.template),
        ))
        .await?;

    info!(batch.id = %submission.batch_id, "Accepted email batch request from CSV file.");
    Ok(HttpResponse::Accepted().json(json!({ "data": { "batchId": submission.batch_id } })))
}

async fn read_params(mut payload: Multipart) -> Result<EmailSendCsvParams, BatchmailError> {
    let mut params = EmailSendCsvParams::default();
    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|err| {
            BatchmailError::client(format!("Cannot read multipart payload: {err}"))
        })?;

        let name = field.name().unwrap_or_default().to_string();
        let max_size = if name == "file" {
            MAX_CSV_FILE_SIZE
        } else {
            MAX_TEXT_FIELD_SIZE
        };

        let mut value = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|err| {
                BatchmailError::client(format!("Cannot read `{name}` field: {err}"))
            })?;
            if value.len() + chunk.len() > max_size {
                return Err(BatchmailError::client(format!(
                    "Field `{name}` exceeds the maximum size of {max_size} bytes."
                )));
            }
            value.extend_from_slice(&chunk);
        }

        let text_value = |value: Vec<u8>| {
            String::from_utf8(value).map_err(|_| {
                BatchmailError::client(format!("Field `{name}` must be a valid UTF-8 string."))
            })
        };

        match name.as_str() {
            "file" => params.file = Some(value),
            "subject" => params.subject = Some(text_value(value)?),
            "body" => params.body = Some(text_value(value)?),
            "template" => params.template = Some(text_value(value)?),
            "targetColumn" => params.target_column = Some(text_value(value)?),
            _ => {}
        }
    }

    Ok(params)
}
