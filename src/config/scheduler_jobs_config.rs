use serde_derive::{Deserialize, Serialize};

/// Configuration for the Batchmail scheduler jobs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SchedulerJobsConfig {
    /// The cron schedule to use for the `BatchReportsSend` job (reports progress of open batches).
    pub batch_reports: String,
}

impl Default for SchedulerJobsConfig {
    fn default() -> Self {
        Self {
            batch_reports: "0 */10 * * * *".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SchedulerJobsConfig;
    use insta::assert_toml_snapshot;

    #[test]
    fn serialization_and_default() {
        assert_toml_snapshot!(SchedulerJobsConfig::default(), @"batch_reports = '0 */10 * * * *'");
    }

    #[test]
    fn deserialization() {
        let config: SchedulerJobsConfig = toml::from_str(
            r#"
        batch_reports = '0/30 * * * * *'
    "#,
        )
        .unwrap();
        assert_eq!(
            config,
            SchedulerJobsConfig {
                batch_reports: "0/30 * * * * *".to_string()
            }
        );
    }
}
