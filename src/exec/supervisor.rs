// src/exec/supervisor.rs

//! Owns the child process of one run.
//!
//! stdout and stderr are read by two independent tasks, each with its own
//! [`LineBuffer`]. Lines are forwarded in per-stream arrival order; no order
//! is imposed across the two streams.

use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::command::InvocationSpec;
use crate::errors::{RelayError, Result};
use crate::exec::abort::{AbortHandle, AbortSignal, abort_pair};
use crate::exec::line_buffer::LineBuffer;
use crate::types::StreamKind;

const READ_CHUNK: usize = 8 * 1024;
const LINE_CHANNEL_CAPACITY: usize = 256;

/// Exit code reported when the process could not be started.
pub const SPAWN_FAILURE_CODE: i32 = -1;

/// How the child process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code; `None` when the process was killed by a signal or never
    /// spawned because the run was aborted first.
    pub code: Option<i32>,
    pub aborted: bool,
    /// Combined stdout/stderr, one line per `\n`, in arrival order.
    pub output: String,
}

impl ProcessExit {
    fn aborted_before_start() -> Self {
        Self {
            code: None,
            aborted: true,
            output: String::new(),
        }
    }
}

/// Lifecycle notifications from the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    /// The invocation is about to be spawned.
    Start(InvocationSpec),
    /// One complete line from one stream.
    Line { stream: StreamKind, text: String },
    /// Process-level failure: spawn, wait or stream read.
    Error { message: String },
    /// The process is gone (or was never started).
    Close(ProcessExit),
}

/// Runs one [`InvocationSpec`] to completion.
#[derive(Debug)]
pub struct ProcessSupervisor {
    spec: InvocationSpec,
    handle: AbortHandle,
    signal: AbortSignal,
}

impl ProcessSupervisor {
    pub fn new(spec: InvocationSpec) -> Self {
        let (handle, signal) = abort_pair();
        Self {
            spec,
            handle,
            signal,
        }
    }

    pub fn spec(&self) -> &InvocationSpec {
        &self.spec
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.clone()
    }

    /// Spawn the process and stream its output into `events`.
    ///
    /// Resolves only after `Close` was emitted: once the process exited, was
    /// killed by `abort()`, or failed to spawn. Any failure (spawn, wait or
    /// reading a stream) emits `Error` before `Close` and is then returned.
    pub async fn run(self, events: mpsc::Sender<SupervisorEvent>) -> Result<ProcessExit> {
        let ProcessSupervisor {
            spec,
            handle: _handle,
            mut signal,
        } = self;

        if signal.is_aborted() {
            info!(command = %spec.command_line(), "run aborted before start; not spawning");
            let exit = ProcessExit::aborted_before_start();
            let _ = events.send(SupervisorEvent::Close(exit.clone())).await;
            return Ok(exit);
        }

        let _ = events.send(SupervisorEvent::Start(spec.clone())).await;
        info!(command = %spec.command_line(), cwd = %spec.options.cwd.display(), "starting test process");

        let mut cmd = Command::new(&spec.runtime);
        cmd.args(&spec.args)
            .envs(&spec.options.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if !spec.options.cwd.as_os_str().is_empty() {
            cmd.current_dir(&spec.options.cwd);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                error!(program = %spec.runtime, error = %source, "failed to spawn test process");
                let _ = events
                    .send(SupervisorEvent::Error {
                        message: format!("failed to spawn '{}': {source}", spec.runtime),
                    })
                    .await;
                let exit = ProcessExit {
                    code: Some(SPAWN_FAILURE_CODE),
                    aborted: false,
                    output: String::new(),
                };
                let _ = events.send(SupervisorEvent::Close(exit)).await;
                return Err(RelayError::SpawnError {
                    program: spec.runtime.clone(),
                    source,
                });
            }
        };

        let (line_tx, mut line_rx) = mpsc::channel::<(StreamKind, String)>(LINE_CHANNEL_CAPACITY);
        let mut readers: Vec<JoinHandle<std::io::Result<()>>> = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(pump(stdout, StreamKind::Stdout, line_tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(pump(stderr, StreamKind::Stderr, line_tx.clone())));
        }
        drop(line_tx);

        let mut output = String::new();
        let mut status = None;
        let mut aborted = false;
        let mut lines_open = true;
        let mut wait_error = None;

        loop {
            tokio::select! {
                line = line_rx.recv(), if lines_open => match line {
                    Some((stream, text)) => {
                        output.push_str(&text);
                        output.push('\n');
                        let _ = events.send(SupervisorEvent::Line { stream, text }).await;
                    }
                    None => lines_open = false,
                },
                res = child.wait(), if status.is_none() => match res {
                    Ok(exit_status) => status = Some(exit_status),
                    Err(e) => {
                        error!(program = %spec.runtime, error = %e, "waiting for test process failed");
                        if let Err(e) = child.start_kill() {
                            warn!(program = %spec.runtime, error = %e, "failed to kill test process");
                        }
                        wait_error = Some(e);
                        break;
                    }
                },
                _ = signal.aborted(), if !aborted && status.is_none() => {
                    aborted = true;
                    info!(program = %spec.runtime, "abort requested; killing test process");
                    if let Err(e) = child.start_kill() {
                        warn!(program = %spec.runtime, error = %e, "failed to kill test process");
                    }
                }
            }

            // Once killed, output still in flight is not worth waiting for.
            if status.is_some() && (!lines_open || aborted) {
                break;
            }
        }

        let abandoned = aborted || wait_error.is_some();
        let mut stream_error = None;
        for reader in readers {
            if abandoned {
                reader.abort();
            }
            match reader.await {
                Ok(Err(e)) if !abandoned => stream_error = Some(e),
                Ok(_) => {}
                Err(join_err) if join_err.is_cancelled() => {}
                Err(join_err) => {
                    stream_error = Some(std::io::Error::other(join_err.to_string()));
                }
            }
        }

        let code = status.and_then(|s| s.code());
        info!(program = %spec.runtime, exit_code = ?code, aborted, "test process exited");

        let exit = ProcessExit {
            code,
            aborted,
            output,
        };

        let failure = match (wait_error, stream_error) {
            (Some(e), _) => Some(format!("waiting for '{}': {e}", spec.runtime)),
            (None, Some(e)) => {
                warn!(program = %spec.runtime, error = %e, "reading test process output failed");
                Some(format!("reading output of '{}': {e}", spec.runtime))
            }
            (None, None) => None,
        };
        finish(&events, exit, failure).await
    }
}

/// Emit the terminal events of a run: `Error` when it failed, then `Close`.
async fn finish(
    events: &mpsc::Sender<SupervisorEvent>,
    exit: ProcessExit,
    failure: Option<String>,
) -> Result<ProcessExit> {
    match failure {
        Some(message) => {
            let _ = events
                .send(SupervisorEvent::Error {
                    message: message.clone(),
                })
                .await;
            let _ = events.send(SupervisorEvent::Close(exit)).await;
            Err(RelayError::ProcessError(message))
        }
        None => {
            let _ = events.send(SupervisorEvent::Close(exit.clone())).await;
            Ok(exit)
        }
    }
}

/// Read `reader` to EOF, forwarding complete lines.
async fn pump<R>(
    mut reader: R,
    stream: StreamKind,
    tx: mpsc::Sender<(StreamKind, String)>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_CHUNK];
    let mut lines = LineBuffer::new();

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        for line in lines.push(&buf[..n]) {
            if tx.send((stream, line)).await.is_err() {
                return Ok(());
            }
        }
    }

    if let Some(rest) = lines.finish() {
        let _ = tx.send((stream, rest)).await;
    }
    debug!(?stream, "output stream closed");
    Ok(())
}
