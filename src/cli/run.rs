//! Run command for statelog.
//!
//! Retries an operation until it succeeds or attempts run out, reporting
//! every failure through a [`StateLogger`] so that a stuck operation
//! produces one log line instead of one per attempt.

use std::fmt;
use std::process::Command;
use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::core::{StateLogger, StateSnapshot};
use crate::error::{Result, StateLogError};

/// Options for the run command.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Maximum attempts; 0 retries forever.
    pub attempts: u32,
    /// Pause between failed attempts.
    pub delay: Duration,
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the run command.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    /// Whether the operation eventually succeeded.
    pub success: bool,
    /// Number of attempts made.
    pub attempts: u32,
    /// Logger state after the last attempt.
    pub state: StateSnapshot,
}

/// An external program run as the monitored operation.
#[derive(Debug, Clone)]
pub struct ProgramOperation {
    program: String,
    args: Vec<String>,
}

impl ProgramOperation {
    /// Create an operation that runs `program` with `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Run the program once, waiting for it to exit.
    ///
    /// A non-zero exit is reported as `exit status <code>`, so repeated
    /// identical failures render identically.
    pub fn attempt(&self) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|e| StateLogError::command(format!("{}: {}", self.program, e)))?;

        if status.success() {
            return Ok(());
        }

        match status.code() {
            Some(code) => Err(StateLogError::command(format!("exit status {}", code))),
            None => Err(StateLogError::command("terminated by signal")),
        }
    }
}

/// The run command implementation.
pub struct RunCommand {
    logger: StateLogger,
}

impl RunCommand {
    /// Create a run command reporting through `logger`.
    pub fn new(logger: StateLogger) -> Self {
        Self { logger }
    }

    /// The logger failures are reported through.
    pub fn logger(&self) -> &StateLogger {
        &self.logger
    }

    /// Retry `operation` until it succeeds or attempts are exhausted.
    pub fn run<F, E>(&self, mut operation: F, options: &RunOptions) -> RunOutput
    where
        F: FnMut() -> std::result::Result<(), E>,
        E: fmt::Display,
    {
        let mut attempts = 0u32;

        let success = loop {
            attempts += 1;
            match operation() {
                Ok(()) => {
                    self.logger.fixed();
                    break true;
                }
                Err(err) => {
                    self.logger.log_error(&err);
                    if options.attempts != 0 && attempts >= options.attempts {
                        break false;
                    }
                    if !options.delay.is_zero() {
                        thread::sleep(options.delay);
                    }
                }
            }
        };

        tracing::debug!(
            name = self.logger.name(),
            attempts,
            success,
            "run finished"
        );

        RunOutput {
            success,
            attempts,
            state: self.logger.snapshot(),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &RunOutput, options: &RunOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &RunOutput) -> String {
        if output.success {
            format!(
                "{} succeeded after {} attempt(s).\n",
                output.state.name, output.attempts
            )
        } else {
            format!(
                "{} still failing after {} attempt(s): {}\n",
                output.state.name,
                output.attempts,
                output.state.last_error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}
