use std::fs;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tangle_core::NotifierConfig;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_node_name")]
    pub node_name: String,
    /// Topics this node joins at startup.
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            node_name: default_node_name(),
            topics: default_topics(),
        }
    }
}

/// The only tunables the notification core recognizes.
#[derive(Debug, Deserialize, Serialize)]
pub struct EventsConfig {
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    #[serde(default = "default_publish_timeout_ms")]
    pub publish_timeout_ms: u64,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            publish_timeout_ms: default_publish_timeout_ms(),
        }
    }
}

impl EventsConfig {
    pub fn notifier_config(&self) -> NotifierConfig {
        NotifierConfig {
            buffer_size: self.buffer_size,
            publish_timeout: Duration::from_millis(self.publish_timeout_ms),
        }
    }
}

fn default_node_name() -> String {
    "tangle-node".to_string()
}

fn default_topics() -> Vec<String> {
    vec!["tangle:lobby".to_string()]
}

fn default_buffer_size() -> usize {
    256
}

fn default_publish_timeout_ms() -> u64 {
    5_000
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let config = if std::path::Path::new(path).exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            tracing::info!("Config file not found at '{}', using defaults", path);
            Config::default()
        };
        Ok(config)
    }
}
