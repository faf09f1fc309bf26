use crate::{
    batches::{Batch, BatchId, BatchStatus},
    error::Error as BatchmailError,
    mailer::EmailTransport,
    server::app_state::AppState,
};
use actix_web::{HttpResponse, web};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
struct BatchDetails {
    #[serde(flatten)]
    batch: Batch,
    status: BatchStatus,
}

/// Returns the batch and its status.
pub async fn email_batch_get<ET: EmailTransport>(
    state: web::Data<AppState<ET>>,
    path: web::Path<String>,
) -> Result<HttpResponse, BatchmailError> {
    let batch_id = parse_batch_id(&path)?;
    match state.api.batches().get_batch(batch_id).await? {
        Some(batch) => Ok(HttpResponse::Ok().json(json!({
            "data": BatchDetails {
                status: batch.status(),
                batch,
            }
        }))),
        None => Err(BatchmailError::not_found(format!(
            "Batch `{batch_id}` is not found."
        ))),
    }
}

/// Parses batch ID from the path segment.
pub(super) fn parse_batch_id(value: &str) -> Result<BatchId, BatchmailError> {
    value
        .parse()
        .map_err(|_| BatchmailError::client(format!("Invalid batch ID `{value}`.")))
}

#[cfg(test)]
mod tests {
    use crate::{
        batches::{BatchStore, SendRecord},
        server::configure,
        tests::{mock_app_state, mock_batch},
    };
    use actix_web::{App, test, web};
    use insta::assert_snapshot;
    use lettre::transport::stub::AsyncStubTransport;
    use serde_json::{Value, json};
    use time::OffsetDateTime;

    #[actix_web::test]
    async fn returns_batch() -> anyhow::Result<()> {
        let state = web::Data::new(mock_app_state()?);
        let batch = mock_batch(2)?;
        state.api.store.insert_batch(&batch).await?;

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure::<AsyncStubTransport>),
        )
        .await;

        let request = || {
            test::TestRequest::get()
                .uri("/email/00000000-0000-0000-0000-000000000001")
                .to_request()
        };

        let response = test::call_service(&app, request()).await;
        assert_eq!(response.status(), 200);
        assert_eq!(
            serde_json::from_slice::<Value>(&test::read_body(response).await)?,
            json!({
                "data": {
                    "id": "00000000-0000-0000-0000-000000000001",
                    "from": "dev@batchmail.dev",
                    "emailCount": 2,
                    "successCount": 0,
                    "failCount": 0,
                    "startAt": "2000-01-01T10:00:00Z",
                    "finishAt": null,
                    "status": "open"
                }
            })
        );

        for position in 0..2 {
            state
                .api
                .store
                .record_send(&SendRecord::delivered(
                    batch.id,
                    position,
                    "a@x.com",
                    OffsetDateTime::from_unix_timestamp(946720810)?,
                ))
                .await?;
        }

        let response = test::call_service(&app, request()).await;
        assert_eq!(response.status(), 200);
        assert_eq!(
            serde_json::from_slice::<Value>(&test::read_body(response).await)?,
            json!({
                "data": {
                    "id": "00000000-0000-0000-0000-000000000001",
                    "from": "dev@batchmail.dev",
                    "emailCount": 2,
                    "successCount": 2,
                    "failCount": 0,
                    "startAt": "2000-01-01T10:00:00Z",
                    "finishAt": "2000-01-01T10:00:10Z",
                    "status": "closed"
                }
            })
        );

        Ok(())
    }

    #[actix_web::test]
    async fn fails_for_unknown_or_invalid_batch() -> anyhow::Result<()> {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(mock_app_state()?))
                .configure(configure::<AsyncStubTransport>),
        )
        .await;

        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/email/00000000-0000-0000-0000-000000000001")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), 404);
        assert_snapshot!(
            String::from_utf8_lossy(&test::read_body(response).await),
            @r###"{"error":"Batch `00000000-0000-0000-0000-000000000001` is not found."}"###
        );

        let response = test::call_service(
            &app,
            test::TestRequest::get().uri("/email/abc").to_request(),
        )
        .await;
        assert_eq!(response.status(), 400);
        assert_snapshot!(
            String::from_utf8_lossy(&test::read_body(response).await),
            @r###"{"error":"Invalid batch ID `abc`."}"###
        );

        Ok(())
    }
}
