//! Message sinks for the state logger.
//!
//! A sink receives one fully formatted message per emission and performs
//! the actual write. The logger treats it as a black box.

pub mod memory;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StateLogError};

pub use memory::MemorySink;

/// A shared message sink.
pub type Sink = Arc<dyn Fn(&str) + Send + Sync>;

/// Wrap a closure as a [`Sink`].
pub fn sink<F>(f: F) -> Sink
where
    F: Fn(&str) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Tracing level a sink writes at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Valid values for a sink level.
pub const VALID_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

impl SinkLevel {
    /// A sink that forwards messages as tracing events at this level.
    pub fn sink(self) -> Sink {
        match self {
            Self::Error => sink(|msg| tracing::error!(target: "statelog", "{}", msg)),
            Self::Warn => sink(|msg| tracing::warn!(target: "statelog", "{}", msg)),
            Self::Info => sink(|msg| tracing::info!(target: "statelog", "{}", msg)),
            Self::Debug => sink(|msg| tracing::debug!(target: "statelog", "{}", msg)),
            Self::Trace => sink(|msg| tracing::trace!(target: "statelog", "{}", msg)),
        }
    }
}

impl fmt::Display for SinkLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(s)
    }
}

impl FromStr for SinkLevel {
    type Err = StateLogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(StateLogError::config(format!(
                "unknown level '{}', expected one of {:?}",
                s, VALID_LEVELS
            ))),
        }
    }
}

/// Sink writing at `ERROR` level.
pub fn tracing_error_sink() -> Sink {
    SinkLevel::Error.sink()
}

/// Sink writing at `INFO` level.
pub fn tracing_info_sink() -> Sink {
    SinkLevel::Info.sink()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_sink_wraps_closure() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let s = sink(move |msg| seen_clone.lock().unwrap().push(msg.to_string()));

        s("hello");
        s("world");

        assert_eq!(*seen.lock().unwrap(), vec!["hello", "world"]);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("error".parse::<SinkLevel>().unwrap(), SinkLevel::Error);
        assert_eq!("WARNING".parse::<SinkLevel>().unwrap(), SinkLevel::Warn);
        assert_eq!(" info ".parse::<SinkLevel>().unwrap(), SinkLevel::Info);
        assert!("loud".parse::<SinkLevel>().is_err());
    }

    #[test]
    fn test_level_display_round_trips() {
        for level in VALID_LEVELS {
            let parsed: SinkLevel = level.parse().unwrap();
            assert_eq!(parsed.to_string(), *level);
        }
    }

    #[test]
    fn test_tracing_sinks_do_not_panic_without_subscriber() {
        tracing_error_sink()("[probe] error: boom");
        tracing_info_sink()("[probe] fixed!");
    }
}
