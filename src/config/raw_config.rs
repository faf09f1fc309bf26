use crate::config::{DatabaseConfig, SchedulerJobsConfig, SmtpConfig};
use figment::{Figment, Metadata, Profile, Provider, providers, providers::Format, value};
use serde_derive::{Deserialize, Serialize};

/// Raw configuration structure that is used to read the configuration from the file.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RawConfig {
    /// Defines a TCP port to listen on.
    pub port: u16,
    /// Configuration for the SMTP relay.
    pub smtp: Option<SmtpConfig>,
    /// Configuration for the durable batch store.
    pub db: Option<DatabaseConfig>,
    /// Configuration for the scheduler jobs.
    pub scheduler: SchedulerJobsConfig,
}

impl RawConfig {
    /// Reads the configuration from the file (TOML) and merges it with the default values.
    pub fn read_from_file(path: &str) -> anyhow::Result<Self> {
        Ok(Figment::from(RawConfig::default())
            .merge(providers::Toml::file(path))
            .merge(providers::Env::prefixed("BATCHMAIL_").split("__"))
            .extract()?)
    }
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            port: 7070,
            smtp: None,
            db: None,
            scheduler: SchedulerJobsConfig::default(),
        }
    }
}

impl Provider for RawConfig {
    fn metadata(&self) -> Metadata {
        Metadata::named("Batchmail main configuration")
    }

    fn data(&self) -> Result<value::Map<Profile, value::Dict>, figment::Error> {
        providers::Serialized::defaults(Self::default()).data()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RawConfig;
    use insta::{assert_debug_snapshot, assert_toml_snapshot};

    #[test]
    fn serialization_and_default() {
        assert_toml_snapshot!(RawConfig::default(), @r###"
        port = 7070

        [scheduler]
        batch_reports = '0 */10 * * * *'
        "###);
    }

    #[test]
    fn deserialization() {
        let config: RawConfig = toml::from_str(
            r#"
        port = 7171

        [smtp]
        address = 'smtp.batchmail.dev'
        username = 'dev@batchmail.dev'
        password = 'password'
        alias = 'Batchmail'
        max_sessions = 2
        send_timeout = 10000

        [db]
        url = 'sqlite::memory:'

        [scheduler]
        batch_reports = '0/30 * * * * *'
    "#,
        )
        .unwrap();

        assert_debug_snapshot!(config, @r###"
        RawConfig {
            port: 7171,
            smtp: Some(
                SmtpConfig {
                    address: "smtp.batchmail.dev",
                    port: 465,
                    username: "dev@batchmail.dev",
                    password: "***",
                    alias: Some(
                        "Batchmail",
                    ),
                    starttls: false,
                    max_sessions: 2,
                    send_timeout: 10s,
                },
            ),
            db: Some(
                DatabaseConfig {
                    url: "sqlite::memory:",
                },
            ),
            scheduler: SchedulerJobsConfig {
                batch_reports: "0/30 * * * * *",
            },
        }
        "###);
    }
}
