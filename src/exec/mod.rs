// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`supervisor`] spawns the test process with `tokio::process::Command`,
//!   demultiplexes stdout/stderr into lines and reports lifecycle events.
//! - [`line_buffer`] holds the per-stream partial-line state.
//! - [`abort`] provides the idempotent cancellation handle.

pub mod abort;
pub mod line_buffer;
pub mod supervisor;

pub use abort::AbortHandle;
pub use line_buffer::LineBuffer;
pub use supervisor::{ProcessExit, ProcessSupervisor, SupervisorEvent};
