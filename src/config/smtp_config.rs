use serde_derive::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use std::{
    fmt::{Debug, Formatter},
    time::Duration,
};

/// Configuration for the SMTP relay.
#[serde_as]
#[derive(Deserialize, Serialize, Clone, PartialEq)]
pub struct SmtpConfig {
    /// Address of the SMTP relay.
    pub address: String,
    /// Port of the SMTP relay. Default is 465 (implicit TLS).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Username to use to authenticate to the SMTP relay, also used as the sender address.
    pub username: String,
    /// Password to use to authenticate to the SMTP relay.
    pub password: String,
    /// Optional display name of the sender.
    pub alias: Option<String>,
    /// Use STARTTLS instead of implicit TLS to encrypt the connection. Default is false.
    #[serde(default)]
    pub starttls: bool,
    /// Maximum number of concurrent SMTP sessions. Default is 4.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u32,
    /// Maximum time allowed to deliver a single email to the relay. Default is 30 seconds.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_send_timeout")]
    pub send_timeout: Duration,
}

impl Debug for SmtpConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("alias", &self.alias)
            .field("starttls", &self.starttls)
            .field("max_sessions", &self.max_sessions)
            .field("send_timeout", &self.send_timeout)
            .finish()
    }
}

const fn default_port() -> u16 {
    465
}

const fn default_max_sessions() -> u32 {
    4
}

const fn default_send_timeout() -> Duration {
    Duration::from_secs(30)
}
