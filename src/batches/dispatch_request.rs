use crate::mailer::EmailBody;

/// Describes where the recipients of the batch come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipients {
    /// Explicit list of the recipient addresses.
    List(Vec<String>),
    /// CSV file, recipient addresses are taken from the `column`.
    Csv { data: Vec<u8>, column: String },
}

/// A request to dispatch the same email to a set of recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub recipients: Recipients,
    pub subject: String,
    pub body: EmailBody,
}

impl DispatchRequest {
    pub fn new(recipients: Recipients, subject: impl Into<String>, body: EmailBody) -> Self {
        Self {
            recipients,
            subject: subject.into(),
            body,
        }
    }
}
