// src/engine/core.rs

//! Pure per-run state machine.
//!
//! [`SessionCore`] consumes [`SupervisorEvent`]s and produces the
//! [`RunEvent`]s the caller sees. It owns a fresh [`ResultCorrelator`] and
//! never touches channels, Tokio or processes, so every ordering can be
//! driven directly from tests.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::correlate::{ResultCorrelator, ResultKind, ResultScope, TestResult};
use crate::engine::{RunError, RunEvent, RunSummary};
use crate::exec::{ProcessExit, SupervisorEvent};
use crate::paths::PathReplacer;
use crate::protocol::{MARKER, parse_line};
use crate::types::StreamKind;

#[derive(Debug)]
pub struct SessionCore {
    replacer: Arc<PathReplacer>,
    correlator: ResultCorrelator,
    summary: RunSummary,
}

impl SessionCore {
    pub fn new(replacer: Arc<PathReplacer>) -> Self {
        Self {
            replacer,
            correlator: ResultCorrelator::new(),
            summary: RunSummary::default(),
        }
    }

    /// Records still waiting for their finish frame (for tests).
    pub fn open_count(&self) -> usize {
        self.correlator.open_count()
    }

    pub fn step(&mut self, event: SupervisorEvent) -> Vec<RunEvent> {
        match event {
            SupervisorEvent::Start(invocation) => vec![RunEvent::Start {
                command: invocation.command_line(),
                invocation,
            }],
            SupervisorEvent::Line { stream, text } => self.on_line(stream, text),
            SupervisorEvent::Error { message } => {
                self.summary.errored = true;
                vec![RunEvent::Error {
                    error: RunError::Process { message },
                }]
            }
            SupervisorEvent::Close(exit) => self.on_close(exit),
        }
    }

    /// Feed one output line.
    pub fn on_line(&mut self, stream: StreamKind, text: String) -> Vec<RunEvent> {
        let parsed = parse_line(&text);
        let mut out = vec![RunEvent::Line { stream, text }];

        let Some(mut event) = parsed else {
            return out;
        };
        event.map_paths(|p| self.replacer.to_local(p));

        let closed = self.correlator.step(&event);
        out.push(RunEvent::Protocol { event });
        if let Some(result) = closed {
            self.count(&result);
            out.push(RunEvent::Result { result });
        }
        out
    }

    fn on_close(&mut self, exit: ProcessExit) -> Vec<RunEvent> {
        let mut out = Vec::new();
        let runner_detected = exit.output.contains(MARKER);

        if exit.aborted {
            let dropped = self.correlator.discard();
            debug!(dropped, "run aborted; discarding open records");
        } else {
            if !self.correlator.is_idle() {
                let dropped = self.correlator.discard();
                warn!(dropped, "process exited with unfinished tests");
            }
            if !runner_detected && !self.summary.errored {
                warn!(exit_code = ?exit.code, "no test protocol in process output");
                self.summary.errored = true;
                out.push(RunEvent::Error {
                    error: RunError::NotTestRunner {
                        output: exit.output.clone(),
                    },
                });
            }
        }

        out.push(RunEvent::Close {
            exit_code: exit.code,
            aborted: exit.aborted,
        });

        self.summary.exit_code = exit.code;
        self.summary.aborted = exit.aborted;
        self.summary.runner_detected = runner_detected;
        self.summary.output = exit.output;
        out
    }

    fn count(&mut self, result: &TestResult) {
        match (result.scope, result.kind) {
            (_, ResultKind::Failed) => self.summary.failed += 1,
            (ResultScope::Test, ResultKind::Passed) => self.summary.passed += 1,
            (ResultScope::Test, ResultKind::Ignored) => self.summary.ignored += 1,
            (ResultScope::Suite, _) => {}
        }
    }

    /// Consume the core, yielding the run's summary.
    pub fn into_summary(self) -> RunSummary {
        self.summary
    }
}
