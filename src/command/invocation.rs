// src/command/invocation.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::command::argv;

/// Fully resolved, ready-to-spawn process description.
///
/// Produced once per run by [`ProcessBuilder`](crate::command::ProcessBuilder)
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationSpec {
    pub runtime: String,
    pub args: Vec<String>,
    pub options: SpawnOptions,
}

/// Working directory and environment overrides for the child. The child
/// also inherits the parent's environment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SpawnOptions {
    pub cwd: PathBuf,
    pub env: BTreeMap<String, String>,
}

impl InvocationSpec {
    /// Shell-like rendering of the command line, for logs.
    pub fn command_line(&self) -> String {
        argv::join(std::iter::once(&self.runtime).chain(self.args.iter()))
    }
}
