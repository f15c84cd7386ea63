//! statelog - deduplicating state logger for retry loops
//!
//! CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use statelog::cli::{ConfigCommand, ConfigOptions, ProgramOperation, RunCommand, RunOptions};
use statelog::config::Config;
use statelog::error::{exit_codes, FailOpen};
use statelog::RelogInterval;

// =============================================================================
// CLI Definition
// =============================================================================

/// statelog - retry a command without flooding the log
#[derive(Parser)]
#[command(name = "statelog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the user/project layers
    #[arg(long = "config-file", global = true)]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command until it succeeds, logging only state changes
    Run {
        /// Label used in log messages (defaults to the program name)
        #[arg(long, short)]
        name: Option<String>,
        /// Re-log policy: "always", "on-change" or a duration like "30s"
        #[arg(long, short)]
        interval: Option<RelogInterval>,
        /// Maximum attempts (0 = unlimited)
        #[arg(long, short, default_value_t = 0)]
        attempts: u32,
        /// Delay between attempts in milliseconds
        #[arg(long, short, default_value_t = 1000)]
        delay_ms: u64,
        /// Print the final state as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress the summary line
        #[arg(long, short)]
        quiet: bool,
        /// Program and arguments to run
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Print the effective configuration
    Config {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "statelog=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("statelog error: {}", e);
            ExitCode::from(exit_codes::USAGE)
        }
    }
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config_file);

    match cli.command {
        Commands::Run {
            name,
            interval,
            attempts,
            delay_ms,
            json,
            quiet,
            command,
        } => run_program(
            &config,
            name,
            interval,
            command,
            RunOptions {
                attempts,
                delay: Duration::from_millis(delay_ms),
                json,
                quiet,
            },
        ),
        Commands::Config { json } => run_config(config, json),
    }
}

/// Load config from an explicit file, or the usual precedence chain.
fn load_config(path: Option<PathBuf>) -> Config {
    match path {
        Some(path) => Config::load_from_file(&path).fail_open_default("loading config"),
        None => Config::load(),
    }
}

fn run_program(
    config: &Config,
    name: Option<String>,
    interval: Option<RelogInterval>,
    command: Vec<String>,
    options: RunOptions,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut parts = command.into_iter();
    let program = parts.next().ok_or("missing program to run")?;
    let operation = ProgramOperation::new(program.clone(), parts.collect());

    let mut builder = config.logger_builder(name.unwrap_or(program));
    if let Some(interval) = interval {
        builder = builder.interval(interval);
    }

    let cmd = RunCommand::new(builder.build());
    let output = cmd.run(|| operation.attempt(), &options);

    let formatted = cmd.format_output(&output, &options);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }

    Ok(ExitCode::from(if output.success {
        exit_codes::SUCCESS
    } else {
        exit_codes::EXHAUSTED
    }))
}

fn run_config(config: Config, json: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let output = ConfigCommand::new(config).run(&ConfigOptions { json })?;
    print!("{}", output);
    Ok(ExitCode::from(exit_codes::SUCCESS))
}
