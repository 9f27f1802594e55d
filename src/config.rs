//! Configuration types for the ws-tether binary

use std::time::Duration;

use serde::Deserialize;

use crate::client::ClientConfig;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// WebSocket URL to connect to
    pub url: String,

    /// Reconnect automatically after a transport failure
    #[serde(default = "default_reconnect")]
    pub reconnect_on_failure: bool,

    /// Delay before the first reconnection attempt (milliseconds)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Cap on the delay between reconnection attempts (milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_reconnect() -> bool {
    true
}
fn default_base_delay_ms() -> u64 {
    250
}
fn default_max_delay_ms() -> u64 {
    16_000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ConnectionConfig {
    /// Build the client configuration for this connection
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.url)
            .reconnect_on_failure(self.reconnect_on_failure)
            .base_delay(Duration::from_millis(self.base_delay_ms))
            .max_delay(Duration::from_millis(self.max_delay_ms))
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
