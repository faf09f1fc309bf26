use crate::{
    error::Error as BatchmailError, mailer::EmailTransport, server::app_state::AppState,
};
use actix_web::{HttpResponse, web};
use tracing::info;

use super::email_batch_get::parse_batch_id;

/// Removes the closed batch together with its send records.
pub async fn email_batch_remove<ET: EmailTransport>(
    state: web::Data<AppState<ET>>,
    path: web::Path<String>,
) -> Result<HttpResponse, BatchmailError> {
    let batch_id = parse_batch_id(&path)?;
    state.api.batches().remove_batch(batch_id).await?;

    info!(batch.id = %batch_id, "Removed email batch.");
    Ok(HttpResponse::NoContent().finish())
}
