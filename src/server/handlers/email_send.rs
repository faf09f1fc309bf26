use crate::{
    batches::{DispatchRequest, Recipients},
    error::Error as BatchmailError,
    mailer::{EmailBody, EmailTransport},
    server::app_state::AppState,
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

#[derive(Deserialize)]
pub struct EmailSendParams {
    pub destinations: Vec<String>,
    pub subject: String,
    pub body: Option<String>,
    pub template: Option<String>,
}

/// Accepts a batch of emails addressed to the explicit list of recipients.
pub async fn email_send<ET: EmailTransport>(
    state: web::Data<AppState<ET>>,
    body_params: web::Json<EmailSendParams>,
) -> Result<HttpResponse, BatchmailError> {
    let params = body_params.into_inner();
    if params.subject.trim().is_empty() {
        return Err(BatchmailError::client("Subject is required."));
    }

    let submission = state
        .api
        .batches()
        .submit(DispatchRequest::new(
            Recipients::List(params.destinations),
            params.subject,
            EmailBody::new(params.body, params.template),
        ))
        .await?;

    info!(batch.id = %submission.batch_id, "Accepted email batch request.");
    Ok(HttpResponse::Accepted().json(json!({ "data": { "batchId": submission.batch_id } })))
}
