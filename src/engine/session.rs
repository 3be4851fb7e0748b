// src/engine/session.rs

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::command::InvocationSpec;
use crate::errors::Result;
use crate::exec::{AbortHandle, ProcessSupervisor, SupervisorEvent};
use crate::paths::PathReplacer;

use super::core::SessionCore;
use super::{RunEvent, RunSummary};

const SUPERVISOR_CHANNEL_CAPACITY: usize = 256;

/// One test run: a supervisor plus a fresh correlator.
///
/// This is the async shell around [`SessionCore`]. It forwards supervisor
/// events into the core and hands whatever the core produces to the caller.
pub struct RunSession {
    supervisor: ProcessSupervisor,
    core: SessionCore,
    coverage_files: Vec<PathBuf>,
}

impl fmt::Debug for RunSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunSession")
            .field("command", &self.supervisor.spec().command_line())
            .field("coverage_files", &self.coverage_files)
            .finish_non_exhaustive()
    }
}

impl RunSession {
    pub fn new(spec: InvocationSpec, replacer: Arc<PathReplacer>) -> Self {
        Self {
            supervisor: ProcessSupervisor::new(spec),
            core: SessionCore::new(replacer),
            coverage_files: Vec::new(),
        }
    }

    /// Remember a local coverage file for the summary. Nothing is read or
    /// removed here.
    pub fn with_coverage_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.coverage_files.push(path.into());
        self
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.supervisor.abort_handle()
    }

    /// Drive the run to completion, sending every [`RunEvent`] to `events`.
    ///
    /// Returns once the process exited, was aborted, or failed to spawn.
    /// Only process-level failures are returned as errors; an aborted run
    /// resolves with `Ok`.
    pub async fn run(self, events: mpsc::Sender<RunEvent>) -> Result<RunSummary> {
        let RunSession {
            supervisor,
            mut core,
            coverage_files,
        } = self;

        let (sup_tx, mut sup_rx) = mpsc::channel::<SupervisorEvent>(SUPERVISOR_CHANNEL_CAPACITY);

        let consume = async {
            while let Some(event) = sup_rx.recv().await {
                for out in core.step(event) {
                    if events.send(out).await.is_err() {
                        debug!("run event receiver dropped; continuing without it");
                    }
                }
            }
        };

        let (outcome, ()) = tokio::join!(supervisor.run(sup_tx), consume);

        let mut summary = core.into_summary();
        summary.coverage_files = coverage_files;
        info!(
            exit_code = ?summary.exit_code,
            aborted = summary.aborted,
            passed = summary.passed,
            failed = summary.failed,
            ignored = summary.ignored,
            "run finished"
        );

        outcome.map(|_| summary)
    }
}
