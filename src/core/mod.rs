//! Core types and logic for statelog.
//!
//! This module contains the state logger, its re-log interval policy and
//! the clock abstraction it takes timestamps from.

pub mod clock;
pub mod interval;
pub mod logger;

pub use clock::{Clock, ManualClock, SystemClock};
pub use interval::RelogInterval;
pub use logger::{StateLogger, StateLoggerBuilder, StateSnapshot};
