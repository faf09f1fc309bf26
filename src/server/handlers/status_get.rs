use crate::{error::Error as BatchmailError, mailer::EmailTransport, server::app_state::AppState};
use actix_web::{HttpResponse, web};
use anyhow::anyhow;
use std::ops::Deref;

pub async fn status_get<ET: EmailTransport>(
    state: web::Data<AppState<ET>>,
) -> Result<HttpResponse, BatchmailError> {
    state
        .status
        .read()
        .map(|status| HttpResponse::Ok().json(status.deref()))
        .map_err(|err| anyhow!("Failed to retrieve server status: {:?}.", err).into())
}

#[cfg(test)]
mod tests {
    use crate::{server::handlers::status_get, tests::mock_app_state};
    use actix_web::{body::MessageBody, web};
    use insta::assert_snapshot;

    #[actix_web::test]
    async fn returns_server_status() -> anyhow::Result<()> {
        let response = status_get(web::Data::new(mock_app_state()?)).await?;
        assert_eq!(response.status(), 200);
        assert_snapshot!(
            String::from_utf8_lossy(&response.into_body().try_into_bytes().unwrap_or_default()),
            @r###"{"version":"1.0.0","level":"available"}"###
        );

        Ok(())
    }
}
