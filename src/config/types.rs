//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::defaults::default_server_name;
use super::listen::ListenConfig;
use super::session::{KeepaliveConfig, SessionConfig};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub keepalive: KeepaliveConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Name reported in logs.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Prometheus metrics HTTP port (0 or unset disables the endpoint).
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            metrics_port: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration. `RUST_LOG` overrides `level`.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.name, "relayd");
        assert_eq!(config.listen.address.port(), 8080);
        assert_eq!(config.session.send_queue, 256);
        assert!(!config.session.require_membership);
        assert!(config.keepalive.ping_every().is_none());
        assert_eq!(config.log.format, LogFormat::Text);
    }

    #[test]
    fn test_full_config_parses() {
        let toml = r#"
[server]
name = "relay.test"
metrics_port = 9191

[listen]
address = "127.0.0.1:18080"

[session]
send_queue = 8
group_queue = 32
require_membership = true

[keepalive]
ping_interval = 30
timeout = 15

[log]
format = "json"
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.metrics_port, Some(9191));
        assert_eq!(config.listen.address.to_string(), "127.0.0.1:18080");
        assert_eq!(config.session.send_queue, 8);
        assert!(config.session.require_membership);
        assert_eq!(
            config.keepalive.idle_limit(),
            Some(std::time::Duration::from_secs(45))
        );
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        let err = toml::from_str::<Config>("[log]\nformat = \"xml\"\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listen]\naddress = \"127.0.0.1:18181\"").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.listen.address.port(), 18181);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
