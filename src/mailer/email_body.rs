use serde::{Deserialize, Serialize};

/// Content of the email. HTML template and plain-text body are mutually exclusive.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum EmailBody {
    /// Plain-text body, sent as `text/plain`.
    Plain(String),
    /// HTML template, sent as `text/html`.
    HtmlTemplate(String),
}

impl EmailBody {
    /// Picks the body variant: a non-empty template supersedes the plain-text body entirely.
    pub fn new(body: Option<String>, template: Option<String>) -> Self {
        match template {
            Some(template) if !template.is_empty() => Self::HtmlTemplate(template),
            _ => Self::Plain(body.unwrap_or_default()),
        }
    }
}
