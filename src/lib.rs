//! statelog - deduplicating state logger for retry loops
//!
//! A long-running process that keeps retrying a failing operation tends to
//! write the same error line on every attempt. A [`StateLogger`] sits in
//! front of the log sink and only lets through what changed: the first
//! error, a different error, the same error again after a cooldown, and
//! the recovery.
//!
//! ```
//! use statelog::{MemorySink, StateLogger};
//!
//! let out = MemorySink::new();
//! let logger = StateLogger::with_sink("do state", out.as_sink());
//!
//! let mut remaining_failures = 4;
//! loop {
//!     if remaining_failures > 0 {
//!         remaining_failures -= 1;
//!         logger.log_error("fails");
//!         continue;
//!     }
//!     logger.fixed();
//!     break;
//! }
//!
//! assert_eq!(
//!     out.messages(),
//!     vec!["[do state] error: fails", "[do state] fixed!"]
//! );
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod sink;

pub use config::Config;
pub use crate::core::{
    Clock, ManualClock, RelogInterval, StateLogger, StateLoggerBuilder, StateSnapshot,
    SystemClock,
};
pub use error::{Result, StateLogError};
pub use sink::{sink, tracing_error_sink, tracing_info_sink, MemorySink, Sink, SinkLevel};
