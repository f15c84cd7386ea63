//! The state logger.
//!
//! Wraps a pair of message sinks and suppresses repeated identical error
//! reports. A report is emitted when the error text changes, when the
//! re-log interval allows it, or on the first error after a healthy
//! period. Recovery is announced once with `fixed()`.
//!
//! State transitions:
//!
//! ```text
//! Healthy        --log_error(e)-->  Erroring(e, now)   emits
//! Erroring(e, t) --log_error(e)-->  Erroring(e, t)     emits only if the interval allows
//! Erroring(e, t) --log_error(e')--> Erroring(e', now)  emits
//! Erroring       --fixed()-------> Healthy             emits
//! Healthy        --fixed()-------> Healthy             silent
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use super::interval::RelogInterval;
use crate::sink::{tracing_error_sink, tracing_info_sink, Sink};

/// Deduplicating, throttling error reporter for one monitored operation.
///
/// Safe to share between threads. Sinks are always invoked after the
/// internal lock is released, so a sink may call back into the same logger.
pub struct StateLogger {
    name: String,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

struct Inner {
    error_sink: Sink,
    success_sink: Sink,
    interval: RelogInterval,
    /// Text of the last emitted error; `None` while healthy.
    last_error: Option<String>,
    last_logged_at: Option<DateTime<Utc>>,
}

/// Point-in-time view of a logger's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// The logger's label.
    pub name: String,
    /// Whether no error is outstanding.
    pub healthy: bool,
    /// Text of the outstanding error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// When an error was last emitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_logged_at: Option<DateTime<Utc>>,
    /// The active re-log policy.
    pub interval: RelogInterval,
}

impl StateLogger {
    /// Create a logger with separate error and recovery sinks.
    pub fn new(
        name: impl Into<String>,
        error_sink: Sink,
        success_sink: Sink,
        interval: impl Into<RelogInterval>,
    ) -> Self {
        Self::builder(name)
            .error_sink(error_sink)
            .success_sink(success_sink)
            .interval(interval)
            .build()
    }

    /// Create a logger that writes errors and recoveries to one sink and
    /// only reports errors when they change.
    pub fn with_sink(name: impl Into<String>, sink: Sink) -> Self {
        Self::builder(name).error_sink(sink).build()
    }

    /// Start building a logger.
    pub fn builder(name: impl Into<String>) -> StateLoggerBuilder {
        StateLoggerBuilder::new(name)
    }

    /// The label used in emitted messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Report a failure of the monitored operation.
    ///
    /// Errors are compared by their rendered text only.
    pub fn log_error<E>(&self, err: &E)
    where
        E: fmt::Display + ?Sized,
    {
        let text = err.to_string();

        let emit = {
            let mut inner = self.lock();
            let now = self.clock.now();
            let elapsed = inner
                .last_logged_at
                .map(|at| (now - at).to_std().unwrap_or_default());
            let changed = inner.last_error.as_deref() != Some(text.as_str());

            if changed || inner.interval.allows_relog(elapsed) {
                let message = format!("[{}] error: {}", self.name, text);
                inner.last_error = Some(text);
                inner.last_logged_at = Some(now);
                Some((Arc::clone(&inner.error_sink), message))
            } else {
                tracing::trace!(
                    target: "statelog",
                    name = %self.name,
                    interval = %inner.interval,
                    "suppressed repeated error"
                );
                None
            }
        };

        if let Some((sink, message)) = emit {
            sink(&message);
        }
    }

    /// Report that the monitored operation succeeded.
    ///
    /// Emits a recovery message only when an error is outstanding, and
    /// never under [`RelogInterval::Always`].
    pub fn fixed(&self) {
        let emit = {
            let mut inner = self.lock();
            if inner.interval.reports_recovery() && inner.last_error.is_some() {
                inner.last_error = None;
                Some((
                    Arc::clone(&inner.success_sink),
                    format!("[{}] fixed!", self.name),
                ))
            } else {
                tracing::trace!(target: "statelog", name = %self.name, "nothing to recover");
                None
            }
        };

        if let Some((sink, message)) = emit {
            sink(&message);
        }
    }

    /// Replace the re-log policy.
    pub fn set_interval(&self, interval: impl Into<RelogInterval>) {
        self.lock().interval = interval.into().normalized();
    }

    /// Replace the recovery sink.
    pub fn set_success_sink(&self, sink: Sink) {
        self.lock().success_sink = sink;
    }

    /// Replace the error sink.
    pub fn set_error_sink(&self, sink: Sink) {
        self.lock().error_sink = sink;
    }

    /// The active re-log policy.
    pub fn interval(&self) -> RelogInterval {
        self.lock().interval
    }

    /// Whether no error is outstanding.
    pub fn is_healthy(&self) -> bool {
        self.lock().last_error.is_none()
    }

    /// Text of the outstanding error, if any.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// When an error was last emitted.
    pub fn last_logged_at(&self) -> Option<DateTime<Utc>> {
        self.lock().last_logged_at
    }

    /// Capture the current state in one consistent read.
    pub fn snapshot(&self) -> StateSnapshot {
        let inner = self.lock();
        StateSnapshot {
            name: self.name.clone(),
            healthy: inner.last_error.is_none(),
            last_error: inner.last_error.clone(),
            last_logged_at: inner.last_logged_at,
            interval: inner.interval,
        }
    }

    // The guarded data stays consistent even if a holder panicked.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for StateLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("StateLogger")
            .field("name", &self.name)
            .field("interval", &inner.interval)
            .field("last_error", &inner.last_error)
            .field("last_logged_at", &inner.last_logged_at)
            .finish_non_exhaustive()
    }
}

/// Builder for [`StateLogger`].
///
/// Without explicit sinks, errors go to `tracing::error!` and recoveries to
/// `tracing::info!`. If only an error sink is given, recoveries go to it too.
pub struct StateLoggerBuilder {
    name: String,
    error_sink: Option<Sink>,
    success_sink: Option<Sink>,
    interval: RelogInterval,
    clock: Arc<dyn Clock>,
}

impl StateLoggerBuilder {
    /// Create a builder for a logger labelled `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error_sink: None,
            success_sink: None,
            interval: RelogInterval::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Set the error sink.
    pub fn error_sink(mut self, sink: Sink) -> Self {
        self.error_sink = Some(sink);
        self
    }

    /// Set the recovery sink.
    pub fn success_sink(mut self, sink: Sink) -> Self {
        self.success_sink = Some(sink);
        self
    }

    /// Set the re-log policy.
    pub fn interval(mut self, interval: impl Into<RelogInterval>) -> Self {
        self.interval = interval.into().normalized();
        self
    }

    /// Set the time source.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the logger in the healthy state.
    pub fn build(self) -> StateLogger {
        let success_sink = match (&self.success_sink, &self.error_sink) {
            (Some(success), _) => Arc::clone(success),
            (None, Some(error)) => Arc::clone(error),
            (None, None) => tracing_info_sink(),
        };
        let error_sink = self.error_sink.unwrap_or_else(tracing_error_sink);

        StateLogger {
            name: self.name,
            clock: self.clock,
            inner: Mutex::new(Inner {
                error_sink,
                success_sink,
                interval: self.interval,
                last_error: None,
                last_logged_at: None,
            }),
        }
    }
}
