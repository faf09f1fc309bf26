use crate::mailer::EmailBody;

/// A single email addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: EmailBody,
}

impl Email {
    pub fn new<R: Into<String>, S: Into<String>>(to: R, subject: S, body: EmailBody) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body,
        }
    }
}
