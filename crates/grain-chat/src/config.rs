//! # Configuration
//!
//! Every setting has a default, so an empty file (or no file at all) yields a working
//! single-process setup. Sources, lowest precedence first:
//!
//! 1. Built-in defaults.
//! 2. A TOML file named by `GRAIN_CHAT_CONFIG`.
//! 3. `GRAIN_CHAT_IDENTITY`, `GRAIN_CHAT_CHANNEL` and `GRAIN_CHAT_CLUSTER_ID`.
//!
//! ```toml
//! [cluster]
//! cluster_id = "helloworldcluster"
//! gateway = "127.0.0.1:30000"
//!
//! [client]
//! identity = "Alexey"
//! default_channel = "general"
//! retry_delay_secs = 5
//! max_retries = 10
//! ```

use crate::bootstrap::FixedIntervalStrategy;
use crate::session::SessionSettings;
use grain_framework::{ClusterEndpoint, SiloConfig};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_PATH_VAR: &str = "GRAIN_CHAT_CONFIG";
pub const IDENTITY_VAR: &str = "GRAIN_CHAT_IDENTITY";
pub const CHANNEL_VAR: &str = "GRAIN_CHAT_CHANNEL";
pub const CLUSTER_ID_VAR: &str = "GRAIN_CHAT_CLUSTER_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClusterSection {
    pub cluster_id: String,
    pub gateway: SocketAddr,
}

impl Default for ClusterSection {
    fn default() -> Self {
        let silo = SiloConfig::default();
        Self {
            cluster_id: silo.cluster_id,
            gateway: silo.gateway,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    pub identity: String,
    pub default_channel: String,
    pub retry_delay_secs: u64,
    pub max_retries: usize,
    pub history_page: i64,
    pub batch_ticks: usize,
    pub units_per_tick: u32,
}

impl Default for ClientSection {
    fn default() -> Self {
        let session = SessionSettings::default();
        Self {
            identity: session.identity,
            default_channel: session.default_channel,
            retry_delay_secs: 5,
            max_retries: 10,
            history_page: session.history_page,
            batch_ticks: session.batch_ticks,
            units_per_tick: session.units_per_tick,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiloSection {
    pub directory_buffer: usize,
    /// Idle timeout for the Ticker. Chat rooms are never evicted. Unset keeps every
    /// activation for the silo's lifetime.
    pub idle_timeout_secs: Option<u64>,
    pub stream_capacity: usize,
}

impl Default for SiloSection {
    fn default() -> Self {
        let silo = SiloConfig::default();
        Self {
            directory_buffer: silo.directory_buffer,
            idle_timeout_secs: None,
            stream_capacity: silo.stream_capacity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub cluster: ClusterSection,
    pub client: ClientSection,
    pub silo: SiloSection,
}

impl ChatConfig {
    /// Loads from the environment of the current process.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Loads using `lookup` in place of the process environment.
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_VAR) {
            Some(path) => {
                let path = PathBuf::from(path);
                let text = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Io { path, source })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(identity) = lookup(IDENTITY_VAR) {
            self.client.identity = identity;
        }
        if let Some(channel) = lookup(CHANNEL_VAR) {
            self.client.default_channel = channel;
        }
        if let Some(cluster_id) = lookup(CLUSTER_ID_VAR) {
            self.cluster.cluster_id = cluster_id;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.client.identity.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "client.identity",
                reason: "must not be empty".to_string(),
            });
        }
        if self.client.default_channel.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "client.default_channel",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn endpoint(&self) -> ClusterEndpoint {
        ClusterEndpoint {
            cluster_id: self.cluster.cluster_id.clone(),
            gateway: self.cluster.gateway,
        }
    }

    pub fn silo_config(&self) -> SiloConfig {
        SiloConfig {
            cluster_id: self.cluster.cluster_id.clone(),
            gateway: self.cluster.gateway,
            directory_buffer: self.silo.directory_buffer,
            idle_timeout: self.silo.idle_timeout_secs.map(Duration::from_secs),
            stream_capacity: self.silo.stream_capacity,
        }
    }

    pub fn retry_strategy(&self) -> FixedIntervalStrategy {
        FixedIntervalStrategy::new(
            self.client.max_retries,
            Duration::from_secs(self.client.retry_delay_secs),
        )
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            identity: self.client.identity.clone(),
            default_channel: self.client.default_channel.clone(),
            history_page: self.client.history_page,
            batch_ticks: self.client.batch_ticks,
            units_per_tick: self.client.units_per_tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::RetryStrategy;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_reference_setup() {
        let config = ChatConfig::load_with(env(&[])).unwrap();

        assert_eq!(config.cluster.cluster_id, "helloworldcluster");
        assert_eq!(config.cluster.gateway.to_string(), "127.0.0.1:30000");
        assert_eq!(config.client.identity, "Alexey");
        assert_eq!(config.client.default_channel, "general");
        assert_eq!(config.client.history_page, 1000);
        assert_eq!(config.silo_config().idle_timeout, None);

        let mut strategy = config.retry_strategy();
        assert_eq!(strategy.max_retries(), 10);
        assert_eq!(strategy.next_backoff(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = ChatConfig::from_toml_str(
            r#"
            [client]
            identity = "Boris"

            [silo]
            idle_timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.client.identity, "Boris");
        assert_eq!(config.client.default_channel, "general");
        assert_eq!(
            config.silo_config().idle_timeout,
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn environment_overrides_win() {
        let config = ChatConfig::load_with(env(&[
            (IDENTITY_VAR, "Vera"),
            (CHANNEL_VAR, "random"),
            (CLUSTER_ID_VAR, "othercluster"),
        ]))
        .unwrap();

        assert_eq!(config.session_settings().identity, "Vera");
        assert_eq!(config.session_settings().default_channel, "random");
        assert_eq!(config.endpoint().cluster_id, "othercluster");
    }

    #[test]
    fn missing_file_and_bad_values_are_reported() {
        let missing = ChatConfig::load_with(env(&[(CONFIG_PATH_VAR, "/nonexistent/chat.toml")]));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let empty_identity = ChatConfig::load_with(env(&[(IDENTITY_VAR, " ")]));
        assert!(matches!(
            empty_identity,
            Err(ConfigError::Invalid {
                key: "client.identity",
                ..
            })
        ));

        assert!(matches!(
            ChatConfig::from_toml_str("[cluster]\ngateway = \"not an address\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
