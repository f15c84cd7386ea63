//! Configuration loading for statelog.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.statelog/config.toml`)
//! 3. User config (`~/.statelog/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. Loggers work with defaults when no
//! config exists.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{RelogInterval, StateLoggerBuilder};
use crate::error::{Result, StateLogError};
use crate::sink::{SinkLevel, VALID_LEVELS};

/// Main configuration struct for statelog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Defaults applied to loggers built from this config.
    pub logger: LoggerConfig,
}

/// Logger defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggerConfig {
    /// Re-log policy: "always", "on-change" or a duration like "30s".
    pub interval: RelogInterval,
    /// Tracing level for error messages.
    pub error_level: SinkLevel,
    /// Tracing level for recovery messages.
    pub success_level: SinkLevel,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            interval: RelogInterval::OnlyOnChange,
            error_level: SinkLevel::Error,
            success_level: SinkLevel::Info,
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain, rooted at the
    /// current directory.
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.statelog/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = statelog_home()?;
        Self::load_from_file(&home.join("config.toml")).ok()
    }

    /// Load project config from `.statelog/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let config_path = cwd.join(".statelog").join("config.toml");
        Self::load_from_file(&config_path).ok()
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| StateLogError::storage(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| StateLogError::config(e.to_string()))
    }

    /// Render config as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| StateLogError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // STATELOG_INTERVAL
        if let Ok(val) = env::var("STATELOG_INTERVAL") {
            match val.parse::<RelogInterval>() {
                Ok(interval) => self.logger.interval = interval,
                Err(_) => eprintln!(
                    "Warning: Invalid STATELOG_INTERVAL value '{}'. \
                    Expected \"always\", \"on-change\" or a duration like \"30s\". \
                    Using '{}'.",
                    val, self.logger.interval
                ),
            }
        }

        // STATELOG_ERROR_LEVEL
        if let Ok(val) = env::var("STATELOG_ERROR_LEVEL") {
            match val.parse::<SinkLevel>() {
                Ok(level) => self.logger.error_level = level,
                Err(_) => eprintln!(
                    "Warning: Invalid STATELOG_ERROR_LEVEL value '{}'. \
                    Valid values: {:?}. Using '{}'.",
                    val, VALID_LEVELS, self.logger.error_level
                ),
            }
        }

        // STATELOG_SUCCESS_LEVEL
        if let Ok(val) = env::var("STATELOG_SUCCESS_LEVEL") {
            match val.parse::<SinkLevel>() {
                Ok(level) => self.logger.success_level = level,
                Err(_) => eprintln!(
                    "Warning: Invalid STATELOG_SUCCESS_LEVEL value '{}'. \
                    Valid values: {:?}. Using '{}'.",
                    val, VALID_LEVELS, self.logger.success_level
                ),
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// Non-default fields of `other` win. A layer cannot reset a field back
    /// to its default once a lower layer changed it.
    fn merge(mut self, other: Config) -> Self {
        let defaults = LoggerConfig::default();
        if other.logger.interval != defaults.interval {
            self.logger.interval = other.logger.interval;
        }
        if other.logger.error_level != defaults.error_level {
            self.logger.error_level = other.logger.error_level;
        }
        if other.logger.success_level != defaults.success_level {
            self.logger.success_level = other.logger.success_level;
        }
        self
    }

    /// A logger builder preconfigured with this config's interval and
    /// tracing sinks at the configured levels.
    pub fn logger_builder(&self, name: impl Into<String>) -> StateLoggerBuilder {
        StateLoggerBuilder::new(name)
            .interval(self.logger.interval)
            .error_sink(self.logger.error_level.sink())
            .success_sink(self.logger.success_level.sink())
    }
}

/// Get the statelog home directory.
///
/// Checks `STATELOG_HOME` first, then falls back to `~/.statelog`.
/// Returns `None` when neither is available.
pub fn statelog_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("STATELOG_HOME") {
        if home.is_empty() {
            tracing::warn!("STATELOG_HOME is empty, using default");
        } else {
            return Some(PathBuf::from(home));
        }
    }

    dirs::home_dir().map(|home| home.join(".statelog"))
}
