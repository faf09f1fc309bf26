mod database_config;
mod raw_config;
mod scheduler_jobs_config;
mod smtp_config;

pub use self::{
    database_config::DatabaseConfig, raw_config::RawConfig,
    scheduler_jobs_config::SchedulerJobsConfig, smtp_config::SmtpConfig,
};
use anyhow::{anyhow, bail};

/// Main server config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Version of the Batchmail binary.
    pub version: String,
    /// HTTP port to bind API server to.
    pub http_port: u16,
    /// Configuration for the SMTP relay used to dispatch emails.
    pub smtp: SmtpConfig,
    /// Configuration for the durable batch store. In-memory store is used if not specified.
    pub db: Option<DatabaseConfig>,
    /// Configuration for the scheduler jobs.
    pub jobs: SchedulerJobsConfig,
}

impl TryFrom<RawConfig> for Config {
    type Error = anyhow::Error;

    fn try_from(raw_config: RawConfig) -> Result<Self, Self::Error> {
        let smtp = raw_config
            .smtp
            .ok_or_else(|| anyhow!("SMTP is not configured."))?;
        if smtp.max_sessions == 0 {
            bail!("SMTP relay must allow at least one session.");
        }

        Ok(Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            http_port: raw_config.port,
            smtp,
            db: raw_config.db,
            jobs: raw_config.scheduler,
        })
    }
}

impl AsRef<Config> for Config {
    fn as_ref(&self) -> &Config {
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{Config, RawConfig, SmtpConfig};
    use std::time::Duration;

    #[test]
    fn requires_smtp_config() {
        let error = Config::try_from(RawConfig::default()).unwrap_err();
        assert_eq!(error.to_string(), "SMTP is not configured.");
    }

    #[test]
    fn can_be_created_from_raw_config() -> anyhow::Result<()> {
        let config = Config::try_from(RawConfig {
            port: 8080,
            smtp: Some(SmtpConfig {
                address: "smtp.batchmail.dev".to_string(),
                port: 465,
                username: "dev@batchmail.dev".to_string(),
                password: "password".to_string(),
                alias: None,
                starttls: false,
                max_sessions: 2,
                send_timeout: Duration::from_secs(10),
            }),
            ..Default::default()
        })?;

        assert_eq!(config.http_port, 8080);
        assert_eq!(config.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.smtp.address, "smtp.batchmail.dev");
        assert_eq!(config.smtp.max_sessions, 2);
        assert!(config.db.is_none());
        assert_eq!(config.jobs.batch_reports, "0 */10 * * * *");

        Ok(())
    }

    #[test]
    fn requires_at_least_one_smtp_session() {
        let error = Config::try_from(RawConfig {
            smtp: Some(SmtpConfig {
                address: "smtp.batchmail.dev".to_string(),
                port: 465,
                username: "dev@batchmail.dev".to_string(),
                password: "password".to_string(),
                alias: None,
                starttls: false,
                max_sessions: 0,
                send_timeout: Duration::from_secs(10),
            }),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(
            error.to_string(),
            "SMTP relay must allow at least one session."
        );
    }
}
