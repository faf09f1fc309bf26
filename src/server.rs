mod app_state;
mod handlers;
mod status;

pub use self::app_state::AppState;
use crate::{
    api::Api,
    batches::{BatchStore, MemoryBatchStore, ServerLogReporter},
    config::Config,
    database::Database,
    error::Error as BatchmailError,
    mailer::{EmailTransport, Mailer},
    scheduler::Scheduler,
};
use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use anyhow::Context;
use lettre::{AsyncSmtpTransport, Tokio1Executor};
use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};
use tracing_actix_web::TracingLogger;

/// Defines how long the in-flight emails are awaited during shutdown.
const MAILER_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[actix_web::main]
pub async fn run(config: Config) -> Result<(), anyhow::Error> {
    let mailer = Mailer::connect(&config.smtp)
        .await
        .with_context(|| "Cannot initialize SMTP relay")?;
    info!(
        "Connected to SMTP relay {}:{} as {}.",
        config.smtp.address,
        config.smtp.port,
        mailer.sender_address()
    );

    let store: Arc<dyn BatchStore> = match config.db {
        Some(ref db_config) => {
            info!("Batches are stored in the database.");
            Arc::new(
                Database::open(&db_config.url)
                    .await
                    .with_context(|| "Cannot open database")?,
            )
        }
        None => {
            info!("Database isn't configured, batches are stored in memory.");
            Arc::new(MemoryBatchStore::default())
        }
    };

    let api = Arc::new(Api::new(
        config.clone(),
        mailer,
        store,
        Arc::new(ServerLogReporter),
    ));

    let interrupted_batches = api
        .batches()
        .resolve_interrupted_batches()
        .await
        .with_context(|| "Cannot resolve interrupted batches")?;
    if interrupted_batches > 0 {
        warn!("Resolved {interrupted_batches} batches interrupted by the previous shutdown.");
    }

    let mut scheduler = Scheduler::start(api.clone())
        .await
        .with_context(|| "Cannot start scheduler")?;

    let http_server_url = format!("0.0.0.0:{}", config.http_port);
    let state = web::Data::new(AppState::new(config, api.clone()));
    let http_server = HttpServer::new(move || {
        App::new()
            .wrap(cors())
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(configure::<AsyncSmtpTransport<Tokio1Executor>>)
    });

    let http_server = http_server
        .bind(&http_server_url)
        .with_context(|| format!("Failed to bind to {}.", &http_server_url))?;

    info!("Batchmail API server is available at http://{http_server_url}");
    http_server.run().await.with_context(|| "Failed to run API server")?;

    info!("API server is stopped, waiting for in-flight batches.");
    if let Err(err) = scheduler.shutdown().await {
        error!("Failed to stop scheduler: {err:?}");
    }

    api.batches().shutdown().await;
    if let Err(err) = api.mailer.close(MAILER_SHUTDOWN_GRACE).await {
        error!("Failed to close SMTP relay sessions: {err}");
    }

    Ok(())
}

/// Registers API routes.
pub fn configure<ET: EmailTransport>(config: &mut web::ServiceConfig) {
    config
        .app_data(web::JsonConfig::default().error_handler(|err, _| {
            BatchmailError::client(err.to_string()).into()
        }))
        .route("/status", web::get().to(handlers::status_get::<ET>))
        .route("/email", web::post().to(handlers::email_send::<ET>))
        .route("/email/csv", web::post().to(handlers::email_send_csv::<ET>))
        .route(
            "/email/{batch_id}",
            web::get().to(handlers::email_batch_get::<ET>),
        )
        .route(
            "/email/{batch_id}",
            web::delete().to(handlers::email_batch_remove::<ET>),
        )
        .route(
            "/email/{batch_id}/records",
            web::get().to(handlers::email_batch_records_get::<ET>),
        );
}

/// Allows cross-origin requests from any origin.
fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "HEAD", "PUT", "PATCH", "POST", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
}
