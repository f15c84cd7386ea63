//! CLI commands for statelog.
//!
//! - **run**: retry a program, logging failures through a state logger
//! - **config**: print the effective configuration

pub mod config_cmd;
pub mod run;

pub use config_cmd::{ConfigCommand, ConfigOptions};
pub use run::{ProgramOperation, RunCommand, RunOptions, RunOutput};
