//! Error types for statelog's ambient surfaces.
//!
//! The logger itself never fails: `log_error` and `fixed` have no result.
//! These errors cover configuration loading, interval parsing and the CLI.
//! Following the fail-open rule, callers that only need a logger should
//! fall back to defaults rather than propagate them.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for statelog operations.
#[derive(Error, Debug)]
pub enum StateLogError {
    /// I/O errors while reading or writing config files.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration parsing or serialization errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// A re-log interval that could not be parsed.
    #[error("invalid interval: {value:?}")]
    InvalidInterval { value: String },

    /// Failures spawning or waiting on a monitored command.
    #[error("command error: {message}")]
    Command { message: String },
}

/// A specialized Result type for statelog operations.
pub type Result<T> = std::result::Result<T, StateLogError>;

impl StateLogError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid interval error.
    pub fn invalid_interval(value: impl Into<String>) -> Self {
        Self::InvalidInterval {
            value: value.into(),
        }
    }

    /// Create a command error.
    pub fn command(message: impl Into<String>) -> Self {
        Self::Command {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for StateLogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

/// Fail-open handling: log a warning and continue with a fallback.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}

/// Exit codes for the `statelog` CLI.
pub mod exit_codes {
    /// The monitored command eventually succeeded.
    pub const SUCCESS: u8 = 0;

    /// Attempts were exhausted while the command was still failing.
    pub const EXHAUSTED: u8 = 1;

    /// The CLI itself failed (bad arguments, unreadable config).
    pub const USAGE: u8 = 2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StateLogError::storage(
            "/tmp/config.toml",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        assert!(err.to_string().contains("storage error"));
        assert!(err.to_string().contains("/tmp/config.toml"));
    }

    #[test]
    fn test_config_error_display() {
        let err = StateLogError::config("invalid TOML");
        assert_eq!(err.to_string(), "config error: invalid TOML");
    }

    #[test]
    fn test_invalid_interval_display() {
        let err = StateLogError::invalid_interval("soon");
        assert_eq!(err.to_string(), "invalid interval: \"soon\"");
    }

    #[test]
    fn test_command_error_display() {
        let err = StateLogError::command("no such file");
        assert_eq!(err.to_string(), "command error: no such file");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: StateLogError = json_err.into();
        assert!(matches!(err, StateLogError::Config { .. }));
    }

    #[test]
    fn test_fail_open_default() {
        let result: Result<Vec<String>> = Err(StateLogError::config("test"));
        assert!(result.fail_open_default("test context").is_empty());
    }

    #[test]
    fn test_fail_open_with() {
        let result: Result<i32> = Err(StateLogError::config("test"));
        assert_eq!(result.fail_open_with("test context", 42), 42);
    }

    #[test]
    fn test_fail_open_success() {
        let result: Result<i32> = Ok(100);
        assert_eq!(result.fail_open_default("test context"), 100);
    }
}
