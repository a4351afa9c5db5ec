use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::common::types::AnyResult;
use crate::configs::*;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Directory holding durable state (the queue-history file).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub votes: VoteLimitsConfig,
    #[serde(default)]
    pub queue: QueueLimitConfig,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            session: SessionConfig::default(),
            votes: VoteLimitsConfig::default(),
            queue: QueueLimitConfig::default(),
            logging: None,
        }
    }
}

impl Config {
    pub fn load() -> AnyResult<Self> {
        let config_path = if std::path::Path::new("config.toml").exists() {
            "config.toml"
        } else if std::path::Path::new("config.default.toml").exists() {
            "config.default.toml"
        } else {
            return Err("config.toml or config.default.toml not found".into());
        };

        tracing::info!("Loading configuration from: {}", config_path);

        let config_str = std::fs::read_to_string(config_path)?;
        if config_str.is_empty() {
            return Err(format!("{} is empty", config_path).into());
        }

        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").expect("defaults should apply");
        assert_eq!(config.votes.limit_count, 2);
        assert_eq!(config.votes.limit_minutes, 60);
        assert_eq!(config.queue.limit_per_user, 0);
        assert!(!config.session.offline);
        assert_eq!(config.session.banned_uris.len(), 1);
        assert_eq!(config.session.easter_egg_uris.len(), 2);
    }

    #[test]
    fn tables_override_defaults() {
        let toml_str = r#"
            data_dir = "/var/lib/partybox"

            [session]
            offline = true
            default_skip_threshold = 5

            [votes]
            limit_count = 4
            limit_minutes = 30

            [queue]
            limit_per_user = 2
        "#;
        let config: Config = toml::from_str(toml_str).expect("valid config");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/partybox"));
        assert!(config.session.offline);
        assert_eq!(config.session.default_skip_threshold, 5);
        assert_eq!(config.votes.limit_count, 4);
        assert_eq!(config.votes.limit_minutes, 30);
        assert_eq!(config.queue.limit_per_user, 2);
    }
}
