//! Configuration management for ClipView
//!
//! This module handles loading, validating, and saving the viewer
//! configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Validation error
    #[error("Config validation failed: {0}")]
    Validation(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Polling and search behaviour
    #[serde(default)]
    pub sync: SyncConfig,

    /// Display settings
    #[serde(default)]
    pub view: ViewConfig,

    /// Where history is read from
    #[serde(default)]
    pub source: SourceConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Interval between background refreshes in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Fetch the full history as soon as the search query is cleared
    #[serde(default = "default_refresh_on_clear")]
    pub refresh_on_clear: bool,
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Show newest entries first
    #[serde(default)]
    pub descending: bool,

    /// Maximum characters shown per entry
    #[serde(default = "default_preview_width")]
    pub preview_width: usize,
}

/// History source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// JSON history export maintained by the capture service
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
}

// Default value functions
fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_refresh_on_clear() -> bool {
    true
}

fn default_preview_width() -> usize {
    80
}

fn default_history_file() -> PathBuf {
    PathBuf::from("~/.local/share/clipview/history.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            refresh_on_clear: default_refresh_on_clear(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            descending: false,
            preview_width: default_preview_width(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            history_file: default_history_file(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            view: ViewConfig::default(),
            source: SourceConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Checks in order:
    /// 1. Path from CLIPVIEW_CONFIG environment variable
    /// 2. ~/.config/clipview/config.toml
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = Self::find_config_path() {
            Self::load_from_path(&path)
        } else {
            let mut config = Self::default();
            config.expand_paths();
            Ok(config)
        }
    }

    /// Load configuration from an explicit path, or the default locations
    pub fn load_config(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(toml_str)?;
        config.expand_paths();
        config.validate()?;
        Ok(config)
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("clipview").join("config.toml"))
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("CLIPVIEW_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        Self::default_path().filter(|p| p.exists())
    }

    fn expand_paths(&mut self) {
        self.source.history_file = expand_path(&self.source.history_file);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 100ms to 1 minute
        if !(100..=60_000).contains(&self.sync.poll_interval_ms) {
            return Err(ConfigError::Validation(
                "poll_interval_ms must be between 100 and 60000".to_string(),
            ));
        }

        if !(10..=1000).contains(&self.view.preview_width) {
            return Err(ConfigError::Validation(
                "preview_width must be between 10 and 1000".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::Validation(format!(
                "unknown log_level: {}",
                other
            ))),
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not find config directory",
            ))
        })?;
        self.save_to(&path)
    }

    /// Write the commented example config to `path`
    pub fn generate_example_config(path: &Path, force: bool) -> Result<(), ConfigError> {
        if !force && path.exists() {
            return Err(ConfigError::Validation(
                "Config file already exists. Use --force to overwrite.".to_string(),
            ));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::generate_example())?;
        Ok(())
    }

    /// Generate example configuration file
    pub fn generate_example() -> String {
        let config = Config::default();

        format!(
            r#"# ClipView Configuration File
# Location: ~/.config/clipview/config.toml

# Logging level (trace, debug, info, warn, error)
log_level = "{}"

# Polling settings
[sync]
# Milliseconds between background refreshes
poll_interval_ms = {}
# Reload the full history as soon as the search box is cleared
refresh_on_clear = {}

# Display settings
[view]
# Show newest entries first
descending = {}
# Maximum characters shown per entry
preview_width = {}

# History source
[source]
# JSON history export written by the capture service
history_file = "{}"
"#,
            config.log_level,
            config.sync.poll_interval_ms,
            config.sync.refresh_on_clear,
            config.view.descending,
            config.view.preview_width,
            config.source.history_file.display(),
        )
    }
}

/// Expand tilde in path
fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(path_str.as_ref());
    PathBuf::from(expanded.into_owned())
}
