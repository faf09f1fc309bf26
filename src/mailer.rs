mod delivery_error;
mod email;
mod email_body;
mod email_transport;
mod mailer_error;

pub use self::{
    delivery_error::DeliveryError,
    email::Email,
    email_body::EmailBody,
    email_transport::{EmailTransport, EmailTransportError},
    mailer_error::MailerError,
};
use crate::config::SmtpConfig;
use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::{
        AsyncSmtpTransportBuilder,
        authentication::{Credentials, Mechanism},
    },
};
use std::{sync::Arc, time::Duration};
use tokio::{sync::Semaphore, time::timeout};
use tracing::debug;

/// Dispatches emails through the SMTP relay. Every in-flight email negotiates its own relay
/// session that lives only as long as the envelope, and the number of concurrent sessions is
/// bounded by `max_sessions`.
pub struct Mailer<ET: EmailTransport> {
    transport: ET,
    sender: Mailbox,
    sessions: Arc<Semaphore>,
    max_sessions: u32,
    send_timeout: Duration,
}

impl Mailer<AsyncSmtpTransport<Tokio1Executor>> {
    /// Connects to the relay described by `config` and verifies that it accepts the credentials.
    pub async fn connect(config: &SmtpConfig) -> Result<Self, MailerError> {
        let transport_builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.address)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.address)
        }
        .map_err(|err| MailerError::Connect(err.to_string()))?;

        Self::connect_with(transport_builder.port(config.port), config).await
    }

    // Sessions aren't pooled, a send abandoned on timeout takes its session down with it.
    async fn connect_with(
        transport_builder: AsyncSmtpTransportBuilder,
        config: &SmtpConfig,
    ) -> Result<Self, MailerError> {
        let transport = transport_builder
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .authentication(vec![Mechanism::Plain])
            .timeout(Some(config.send_timeout))
            .build();

        match transport.test_connection().await {
            Ok(true) => {}
            Ok(false) => {
                return Err(MailerError::Connect(format!(
                    "{}:{} didn't respond to the connection test.",
                    config.address, config.port
                )));
            }
            Err(err) if err.is_permanent() => return Err(MailerError::Auth(err.to_string())),
            Err(err) => return Err(MailerError::Connect(err.to_string())),
        }

        Self::new(transport, config)
    }
}

impl<ET: EmailTransport> Mailer<ET> {
    /// Creates a mailer on top of an already configured transport.
    pub fn new(transport: ET, config: &SmtpConfig) -> Result<Self, MailerError> {
        let sender_address = config
            .username
            .parse::<Address>()
            .map_err(|err| MailerError::InvalidSender(format!("{}: {err}", config.username)))?;

        Ok(Self {
            transport,
            sender: Mailbox::new(config.alias.clone(), sender_address),
            sessions: Arc::new(Semaphore::new(config.max_sessions as usize)),
            max_sessions: config.max_sessions,
            send_timeout: config.send_timeout,
        })
    }

    /// Returns the address emails are sent from.
    pub fn sender_address(&self) -> String {
        self.sender.email.to_string()
    }

    /// Returns the underlying transport.
    #[cfg(test)]
    pub fn transport(&self) -> &ET {
        &self.transport
    }

    /// Sends a single email. The relay session is held only for the duration of the envelope and
    /// released on every exit path.
    pub async fn send(&self, email: &Email) -> Result<(), DeliveryError> {
        let message = self.build_message(email)?;

        let _session = self.sessions.acquire().await.map_err(|_| {
            DeliveryError::RelayUnavailable("Mailer is already closed.".to_string())
        })?;

        match timeout(self.send_timeout, self.transport.send(message)).await {
            Ok(Ok(_)) => {
                debug!("Sent email to {}.", email.to);
                Ok(())
            }
            Ok(Err(err)) => Err(err.to_delivery_error()),
            Err(_) => Err(DeliveryError::Transport(format!(
                "Email wasn't delivered within {}.",
                humantime::format_duration(self.send_timeout)
            ))),
        }
    }

    /// Stops accepting new emails and waits up to `grace` for the in-flight ones.
    pub async fn close(&self, grace: Duration) -> Result<(), MailerError> {
        let in_flight = timeout(grace, self.sessions.acquire_many(self.max_sessions)).await;
        self.sessions.close();

        match in_flight {
            Ok(_) => Ok(()),
            Err(_) => Err(MailerError::Close(format!(
                "in-flight emails weren't delivered within {}.",
                humantime::format_duration(grace)
            ))),
        }
    }

    fn build_message(&self, email: &Email) -> Result<Message, DeliveryError> {
        let recipient = email.to.trim().parse::<Mailbox>().map_err(|err| {
            DeliveryError::RecipientRejected(format!(
                "Cannot parse TO address `{}`: {err}",
                email.to
            ))
        })?;

        let message_builder = Message::builder()
            .from(self.sender.clone())
            .to(recipient)
            .subject(&email.subject);

        let (content_type, content) = match &email.body {
            EmailBody::Plain(text) => (ContentType::TEXT_PLAIN, text.clone()),
            EmailBody::HtmlTemplate(html) => (ContentType::TEXT_HTML, html.clone()),
        };

        message_builder
            .header(content_type)
            .body(content)
            .map_err(|err| DeliveryError::Transport(format!("Cannot build email: {err}")))
    }
}
