/// Describes failures of the mail relay session lifecycle.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MailerError {
    /// Configured sender address cannot be used.
    #[error("Invalid sender address: {0}")]
    InvalidSender(String),
    /// The relay rejected configured credentials.
    #[error("Failed to authenticate to the SMTP relay: {0}")]
    Auth(String),
    /// The relay cannot be reached or didn't complete the handshake.
    #[error("Failed to connect to the SMTP relay: {0}")]
    Connect(String),
    /// In-flight sessions weren't released in time during shutdown.
    #[error("Failed to close the SMTP relay sessions: {0}")]
    Close(String),
}
