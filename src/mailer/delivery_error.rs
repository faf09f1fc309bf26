/// Describes why an email couldn't be delivered to the relay. Delivery errors are per-recipient
/// and never abort the batch.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The recipient address is invalid or was permanently rejected by the relay.
    #[error("Recipient rejected: {0}")]
    RecipientRejected(String),
    /// The relay is temporarily unable to accept the email.
    #[error("Relay unavailable: {0}")]
    RelayUnavailable(String),
    /// Any other transport failure, including timeouts.
    #[error("Transport error: {0}")]
    Transport(String),
}
