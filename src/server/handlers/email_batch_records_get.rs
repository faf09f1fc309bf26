use crate::{
    error::Error as BatchmailError, mailer::EmailTransport, server::app_state::AppState,
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;

use super::email_batch_get::parse_batch_id;

#[derive(Deserialize)]
pub struct EmailBatchRecordsParams {
    pub email: Option<String>,
}

/// Returns send records of the batch, optionally filtered by the recipient address.
pub async fn email_batch_records_get<ET: EmailTransport>(
    state: web::Data<AppState<ET>>,
    path: web::Path<String>,
    query: web::Query<EmailBatchRecordsParams>,
) -> Result<HttpResponse, BatchmailError> {
    let batch_id = parse_batch_id(&path)?;
    let email = query.email.as_deref().filter(|email| !email.is_empty());
    match state
        .api
        .batches()
        .get_send_records(batch_id, email)
        .await?
    {
        Some(records) => Ok(HttpResponse::Ok().json(json!({ "data": records }))),
        None => Err(BatchmailError::not_found(format!(
            "Batch `{batch_id}` is not found."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        batches::{BatchStore, SendRecord},
        mailer::DeliveryError,
        server::configure,
        tests::{mock_app_state, mock_batch},
    };
    use actix_web::{App, test, web};
    use lettre::transport::stub::AsyncStubTransport;
    use serde_json::{Value, json};
    use time::OffsetDateTime;

    #[actix_web::test]
    async fn returns_send_records() -> anyhow::Result<()> {
        let state = web::Data::new(mock_app_state()?);
        let batch = mock_batch(3)?;
        state.api.store.insert_batch(&batch).await?;

        let sent_at = OffsetDateTime::from_unix_timestamp(946720810)?;
        for record in [
            SendRecord::delivered(batch.id, 0, "a@x.com", sent_at),
            SendRecord::failed(
                batch.id,
                1,
                "b@x",
                sent_at,
                &DeliveryError::RecipientRejected("bad address".to_string()),
            ),
        ] {
            state.api.store.record_send(&record).await?;
        }

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure::<AsyncStubTransport>),
        )
        .await;

        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/email/00000000-0000-0000-0000-000000000001/records")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), 200);
        assert_eq!(
            serde_json::from_slice::<Value>(&test::read_body(response).await)?,
            json!({
                "data": [
                    {
                        "batchId": "00000000-0000-0000-0000-000000000001",
                        "position": 0,
                        "email": "a@x.com",
                        "isSent": true,
                        "sentAt": "2000-01-01T10:00:10Z"
                    },
                    {
                        "batchId": "00000000-0000-0000-0000-000000000001",
                        "position": 1,
                        "email": "b@x",
                        "isSent": false,
                        "sentAt": "2000-01-01T10:00:10Z",
                        "log": "Recipient rejected: bad address"
                    }
                ]
            })
        );

        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/email/00000000-0000-0000-0000-000000000001/records?email=a%40x.com")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), 200);
        let body = serde_json::from_slice::<Value>(&test::read_body(response).await)?;
        assert_eq!(body["data"].as_array().map(|records| records.len()), Some(1));
        assert_eq!(body["data"][0]["email"], "a@x.com");

        Ok(())
    }

    #[actix_web::test]
    async fn fails_for_unknown_batch() -> anyhow::Result<()> {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(mock_app_state()?))
                .configure(configure::<AsyncStubTransport>),
        )
        .await;

        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/email/00000000-0000-0000-0000-000000000001/records")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), 404);

        Ok(())
    }
}
