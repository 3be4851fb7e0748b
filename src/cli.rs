// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::PathStyle;

/// Command-line arguments for `phpunit-relay`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "phpunit-relay",
    version,
    about = "Run PHPUnit locally, over SSH or inside a container and stream structured results.",
    long_about = None
)]
pub struct CliArgs {
    /// Test file or directory to run (local path).
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `phpunit-relay.toml` in the working directory. A missing
    /// default file is not an error.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Working directory of the project (defaults to the current directory).
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// `--filter` regular expression passed to the test runner.
    #[arg(long, value_name = "REGEX")]
    pub filter: Option<String>,

    /// Extra test runner arguments, shell-style (e.g. "--group slow").
    #[arg(long, value_name = "STRING", allow_hyphen_values = true)]
    pub args: Option<String>,

    /// How to run the tests.
    #[arg(long, value_enum, default_value = "run")]
    pub mode: CliMode,

    /// Debugger port used with `--mode debug`.
    #[arg(long, value_name = "PORT")]
    pub debug_port: Option<u16>,

    /// Clover file written with `--mode coverage`.
    #[arg(long, value_name = "PATH")]
    pub coverage_file: Option<PathBuf>,

    /// Syntax of local paths (`posix` or `windows`). Overrides `path_style`
    /// from the config file; defaults to the host's.
    #[arg(long, value_name = "STYLE")]
    pub path_style: Option<PathStyle>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PHPUNIT_RELAY_LOG` directives or `info` are used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the invocation, but don't spawn anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Run mode as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum CliMode {
    Run,
    Debug,
    Coverage,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
