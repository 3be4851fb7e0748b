// src/command/context.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::paths::{PathReplacer, PathVariables};
use crate::types::PathStyle;

/// Default runtime binary.
pub const DEFAULT_RUNTIME: &str = "php";

/// Default framework binary, relative to the working directory.
pub const DEFAULT_FRAMEWORK: &str = "vendor/bin/phpunit";

/// Everything needed to turn a test request into a process, as supplied by
/// configuration. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    pub runtime_binary: String,
    pub framework_binary: String,
    /// Command template; empty means the default template.
    pub command_template: String,
    pub runtime_args: Vec<String>,
    pub extra_args: Vec<String>,
    pub environment: BTreeMap<String, String>,
    pub working_directory: PathBuf,
    /// Syntax of local paths.
    pub path_style: PathStyle,
    /// Raw `local → remote` pairs; may contain `${...}` path variables.
    pub path_mappings: BTreeMap<String, String>,
}

impl ExecutionContext {
    /// Context running `vendor/bin/phpunit` with `php` in `working_directory`.
    pub fn new(working_directory: impl Into<PathBuf>) -> Self {
        Self {
            runtime_binary: DEFAULT_RUNTIME.to_string(),
            framework_binary: DEFAULT_FRAMEWORK.to_string(),
            command_template: String::new(),
            runtime_args: Vec::new(),
            extra_args: Vec::new(),
            environment: BTreeMap::new(),
            working_directory: working_directory.into(),
            path_style: PathStyle::host(),
            path_mappings: BTreeMap::new(),
        }
    }

    /// Build the path replacer for this context, with the home directory
    /// of the current user.
    pub fn path_replacer(&self) -> PathReplacer {
        let variables = PathVariables::detect(&self.working_directory, self.path_style);
        PathReplacer::new(variables, &self.path_mappings)
    }
}
