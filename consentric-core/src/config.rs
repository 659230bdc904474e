//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/consentric/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/consentric/` (~/.config/consentric/)
//! - Data: `$XDG_DATA_HOME/consentric/` (~/.local/share/consentric/)
//! - State/Logs: `$XDG_STATE_HOME/consentric/` (~/.local/state/consentric/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
///
/// The tuning fields (`interval`, `max_events`, `queue_size`,
/// `session_update`) are forwarded untouched to the wrapped analytics
/// service at `init`; this layer does not act on them.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Application identifier registered with the analytics service
    pub app_key: String,

    /// Analytics service endpoint
    #[serde(default)]
    pub url: Option<String>,

    /// Stable device identity; generated and persisted when absent
    #[serde(default)]
    pub device_id: Option<String>,

    /// Wire up default click/form/link/scroll/session/view/error trackers
    #[serde(default)]
    pub auto_track: bool,

    /// Queue drain interval in milliseconds
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Events batched before the service sends them
    #[serde(default = "default_max_events")]
    pub max_events: usize,

    /// Upper bound on the service's request queue
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    /// Session heartbeat period in seconds
    #[serde(default = "default_session_update")]
    pub session_update: u64,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_key: String::new(),
            url: None,
            device_id: None,
            auto_track: false,
            interval: default_interval(),
            max_events: default_max_events(),
            queue_size: default_queue_size(),
            session_update: default_session_update(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_interval() -> u64 {
    500
}

fn default_max_events() -> usize {
    100
}

fn default_queue_size() -> usize {
    1000
}

fn default_session_update() -> u64 {
    60
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Create a config with the given app key and defaults for the rest
    pub fn with_app_key(app_key: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            ..Default::default()
        }
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.app_key.trim().is_empty() {
            return Err(Error::Config("app_key is required".to_string()));
        }
        if self.interval == 0 {
            return Err(Error::Config("interval must be greater than 0".to_string()));
        }
        if self.max_events == 0 {
            return Err(Error::Config(
                "max_events must be greater than 0".to_string(),
            ));
        }
        if self.queue_size < self.max_events {
            return Err(Error::Config(
                "queue_size must be at least max_events".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/consentric/config.toml` (~/.config/consentric/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("consentric").join("config.toml")
    }

    /// Returns the data directory path (for the consent store)
    ///
    /// `$XDG_DATA_HOME/consentric/` (~/.local/share/consentric/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("consentric")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/consentric/` (~/.local/state/consentric/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("consentric")
    }

    /// Returns the default store file path
    ///
    /// `$XDG_DATA_HOME/consentric/store.db` (~/.local/share/consentric/store.db)
    pub fn store_path() -> PathBuf {
        Self::data_dir().join("store.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/consentric/consentric.log` (~/.local/state/consentric/consentric.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("consentric.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.url.is_none());
        assert!(!config.auto_track);
        assert_eq!(config.interval, 500);
        assert_eq!(config.max_events, 100);
        assert_eq!(config.queue_size, 1000);
        assert_eq!(config.session_update, 60);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
app_key = "demo-app"
url = "https://analytics.example.com"
auto_track = true

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.app_key, "demo-app");
        assert_eq!(config.url.as_deref(), Some("https://analytics.example.com"));
        assert!(config.auto_track);
        assert_eq!(config.interval, 500);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validate_requires_app_key() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let config = Config::with_app_key("demo-app");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_queue_bounds() {
        let config = Config {
            max_events: 0,
            ..Config::with_app_key("demo-app")
        };
        assert!(config.validate().is_err());

        let config = Config {
            max_events: 50,
            queue_size: 10,
            ..Config::with_app_key("demo-app")
        };
        assert!(config.validate().is_err());

        let config = Config {
            interval: 0,
            ..Config::with_app_key("demo-app")
        };
        assert!(config.validate().is_err());
    }
}
