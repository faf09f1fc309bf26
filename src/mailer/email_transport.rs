use crate::mailer::DeliveryError;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
    transport::{
        smtp::Error as SmtpError,
        stub::{AsyncStubTransport, Error as StubError},
    },
};
use std::error::Error as StdError;

pub trait EmailTransport: AsyncTransport<Error: EmailTransportError> + Sync + Send + 'static {}
impl EmailTransport for AsyncSmtpTransport<Tokio1Executor> {}
impl EmailTransport for AsyncStubTransport {}

pub trait EmailTransportError: StdError + Sync + Send + 'static {
    /// Classifies transport error as a per-recipient delivery failure.
    fn to_delivery_error(&self) -> DeliveryError {
        DeliveryError::Transport(self.to_string())
    }
}

impl EmailTransportError for SmtpError {
    fn to_delivery_error(&self) -> DeliveryError {
        if self.is_permanent() {
            DeliveryError::RecipientRejected(self.to_string())
        } else if self.is_transient() {
            DeliveryError::RelayUnavailable(self.to_string())
        } else {
            DeliveryError::Transport(self.to_string())
        }
    }
}

impl EmailTransportError for StubError {}
