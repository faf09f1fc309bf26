use serde_derive::{Deserialize, Serialize};

/// Configuration for the durable batch store.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite:batchmail.db?mode=rwc`.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:batchmail.db?mode=rwc".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::DatabaseConfig;
    use insta::assert_toml_snapshot;

    #[test]
    fn serialization_and_default() {
        assert_toml_snapshot!(DatabaseConfig::default(), @"url = 'sqlite:batchmail.db?mode=rwc'");
    }

    #[test]
    fn deserialization() {
        let config: DatabaseConfig = toml::from_str(
            r#"
        url = 'sqlite::memory:'
    "#,
        )
        .unwrap();
        assert_eq!(
            config,
            DatabaseConfig {
                url: "sqlite::memory:".to_string()
            }
        );
    }
}
