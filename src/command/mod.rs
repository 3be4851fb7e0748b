// src/command/mod.rs

//! Turning "run these tests" into a concrete process invocation.
//!
//! - [`context`] holds the immutable per-run [`ExecutionContext`].
//! - [`builder`] expands the command template into an [`InvocationSpec`]
//!   for local, SSH and container/shell topologies.
//! - [`filter_codec`] carries `--filter` values safely through re-quoting.
//! - [`argv`] is the quote-aware tokenizer shared by the above.

use std::path::PathBuf;

pub mod argv;
pub mod builder;
pub mod context;
pub mod filter_codec;
pub mod invocation;

pub use builder::{ProcessBuilder, is_remote_command, prepare_template};
pub use context::ExecutionContext;
pub use invocation::{InvocationSpec, SpawnOptions};

/// What to run: a local file or directory, optionally narrowed by a
/// `--filter` regular expression. Both come from test discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestTarget {
    pub path: Option<String>,
    pub filter: Option<String>,
}

impl TestTarget {
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// How the runtime is instrumented for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Run,
    /// Start an Xdebug session, optionally on a specific client port.
    Debug { port: Option<u16> },
    /// Collect coverage into a Clover file (local path).
    Coverage { clover_file: PathBuf },
}
