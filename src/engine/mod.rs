// src/engine/mod.rs

//! Run orchestration.
//!
//! One run ties together:
//! - the process supervisor (spawn, line demultiplexing, abort)
//! - the protocol parser (line → typed event)
//! - the result correlator (events → closed results)
//!
//! The pure state machine lives in [`core`]; the async shell that drives
//! the supervisor and forwards events lives in [`session`].

use std::path::PathBuf;

use serde::Serialize;

use crate::command::InvocationSpec;
use crate::correlate::TestResult;
use crate::protocol::ProtocolEvent;
use crate::types::StreamKind;

pub mod core;
pub mod session;

pub use self::core::SessionCore;
pub use session::RunSession;

/// Everything a run reports to its caller, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RunEvent {
    /// The invocation is about to be spawned.
    Start {
        command: String,
        invocation: InvocationSpec,
    },
    /// One raw output line, for diagnostic logging.
    Line { stream: StreamKind, text: String },
    /// A decoded protocol frame, paths already translated to local ones.
    Protocol { event: ProtocolEvent },
    /// A closed test or suite result.
    Result { result: TestResult },
    Error { error: RunError },
    #[serde(rename_all = "camelCase")]
    Close { exit_code: Option<i32>, aborted: bool },
}

/// Process-level problems of a run. Per-line problems never show up here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RunError {
    /// Spawn or stream failure reported by the supervisor.
    Process { message: String },
    /// The process ran but never spoke the test protocol.
    NotTestRunner { output: String },
}

/// Final accounting of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub exit_code: Option<i32>,
    pub aborted: bool,
    /// Whether the protocol marker showed up anywhere in the output.
    pub runner_detected: bool,
    /// Set when an `Error` event was emitted.
    pub errored: bool,
    pub passed: usize,
    /// Failed tests plus failed suites (e.g. a failing `setUpBeforeClass`).
    pub failed: usize,
    pub ignored: usize,
    /// Local coverage files the runner was asked to write.
    pub coverage_files: Vec<PathBuf>,
    pub output: String,
}

impl RunSummary {
    /// True when the run completed without process errors or failures.
    /// An aborted run counts as succeeded.
    pub fn succeeded(&self) -> bool {
        if self.aborted {
            return !self.errored;
        }
        !self.errored && self.failed == 0 && self.exit_code.unwrap_or(0) == 0
    }
}
