// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod correlate;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod paths;
pub mod protocol;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::cli::{CliArgs, CliMode};
use crate::command::{ExecutionContext, ProcessBuilder, RunMode, TestTarget};
use crate::config::load_optional;
use crate::engine::{RunEvent, RunSession, RunSummary};
use crate::fs::RealFileSystem;

/// Exit code: every result passed (or the run was aborted).
pub const EXIT_OK: i32 = 0;
/// Exit code: at least one test failed.
pub const EXIT_FAILURES: i32 = 1;
/// Exit code: spawn failure, stream failure or output that is not from a
/// test runner.
pub const EXIT_PROCESS_ERROR: i32 = 2;

/// Clover file used with `--mode coverage` when no file is given.
pub const DEFAULT_COVERAGE_FILE: &str = "coverage.xml";

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the per-run context and path replacer
/// - invocation building
/// - the run session, Ctrl-C handling and JSON output
pub async fn run(args: CliArgs) -> Result<i32> {
    let cwd = match &args.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("resolving current directory")?,
    };

    let cfg = load_optional(&RealFileSystem, args.config.as_deref(), &cwd)
        .context("loading configuration")?;
    let mut context = ExecutionContext::from_config(&cfg, &cwd);
    if let Some(style) = args.path_style {
        context.path_style = style;
    }
    let replacer = Arc::new(context.path_replacer());
    let mode = run_mode(&args, &context.working_directory);

    let target = TestTarget {
        path: args.path.clone(),
        filter: args.filter.clone(),
    };
    let mut builder = ProcessBuilder::new(&context, &replacer)
        .with_target(target)
        .with_mode(mode.clone());
    if let Some(extra) = &args.args {
        builder = builder.with_arguments(extra)?;
    }
    let spec = builder.build()?;

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&spec)?);
        debug!("dry-run complete (no execution)");
        return Ok(EXIT_OK);
    }

    let mut session = RunSession::new(spec, Arc::clone(&replacer));
    if let RunMode::Coverage { clover_file } = &mode {
        session = session.with_coverage_file(clover_file.clone());
    }

    // Ctrl-C → abort the run.
    let abort = session.abort_handle();
    let ctrl_c = tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            return;
        }
        info!("Ctrl+C received; aborting run");
        abort.abort();
    });

    let (tx, rx) = mpsc::channel::<RunEvent>(EVENT_CHANNEL_CAPACITY);
    let printer = tokio::spawn(print_events(rx));

    let outcome = session.run(tx).await;
    ctrl_c.abort();
    printer.await.context("joining event printer")??;

    Ok(match outcome {
        Ok(summary) => exit_code(&summary),
        Err(e) => {
            error!(error = %e, "run failed");
            EXIT_PROCESS_ERROR
        }
    })
}

/// Map a finished run onto the process exit code.
pub fn exit_code(summary: &RunSummary) -> i32 {
    if summary.errored {
        EXIT_PROCESS_ERROR
    } else if summary.succeeded() {
        EXIT_OK
    } else {
        EXIT_FAILURES
    }
}

fn run_mode(args: &CliArgs, working_directory: &Path) -> RunMode {
    match args.mode {
        CliMode::Run => RunMode::Run,
        CliMode::Debug => RunMode::Debug {
            port: args.debug_port,
        },
        CliMode::Coverage => {
            let clover_file = match &args.coverage_file {
                Some(path) if path.is_absolute() => path.clone(),
                Some(path) => working_directory.join(path),
                None => working_directory.join(PathBuf::from(DEFAULT_COVERAGE_FILE)),
            };
            RunMode::Coverage { clover_file }
        }
    }
}

/// Write every event except raw lines to stdout, one JSON object per line.
/// Raw lines go to the log.
async fn print_events(mut rx: mpsc::Receiver<RunEvent>) -> Result<()> {
    while let Some(event) = rx.recv().await {
        if let RunEvent::Line { stream, text } = &event {
            debug!(target: "phpunit_relay::output", ?stream, "{text}");
            continue;
        }
        let json = serde_json::to_string(&event).context("serializing run event")?;
        println!("{json}");
    }
    Ok(())
}
