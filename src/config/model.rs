// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::command::ExecutionContext;
use crate::command::context::{DEFAULT_FRAMEWORK, DEFAULT_RUNTIME};
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::PathStyle;

/// Framework binaries probed, in order, when `phpunit` is not configured.
pub const FRAMEWORK_CANDIDATES: [&str; 2] = ["vendor/bin/pest", "vendor/bin/phpunit"];

/// Configuration as read from TOML, before validation.
///
/// ```toml
/// php = "php"
/// phpunit = "vendor/bin/paratest"
/// command = "docker compose exec -T app sh -c"
/// args = ["--group", "fast"]
/// php_args = ["-dmemory_limit=-1"]
/// path_style = "posix"
///
/// [environment]
/// APP_ENV = "testing"
///
/// [paths]
/// "${workspaceFolder}" = "/app"
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Runtime binary.
    #[serde(default = "default_php")]
    pub php: String,

    /// Framework binary; probed under `vendor/bin` when absent.
    #[serde(default)]
    pub phpunit: Option<String>,

    /// Command template or prefix; empty means the default template.
    #[serde(default)]
    pub command: String,

    /// Extra framework arguments.
    #[serde(default)]
    pub args: Vec<String>,

    /// Extra runtime arguments.
    #[serde(default)]
    pub php_args: Vec<String>,

    /// Overrides the directory the process is started in.
    #[serde(default)]
    pub working_directory: Option<PathBuf>,

    /// Local path syntax; the host's when absent.
    #[serde(default)]
    pub path_style: Option<PathStyle>,

    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    /// `local → remote` path mappings.
    #[serde(default)]
    pub paths: BTreeMap<String, String>,
}

fn default_php() -> String {
    DEFAULT_RUNTIME.to_string()
}

/// Validated configuration. Only produced through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub php: String,
    pub phpunit: Option<String>,
    pub command: String,
    pub args: Vec<String>,
    pub php_args: Vec<String>,
    pub working_directory: Option<PathBuf>,
    pub path_style: PathStyle,
    pub environment: BTreeMap<String, String>,
    pub paths: BTreeMap<String, String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile {
            php: default_php(),
            ..RawConfigFile::default()
        })
    }
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            php: raw.php,
            phpunit: raw.phpunit,
            command: raw.command,
            args: raw.args,
            php_args: raw.php_args,
            working_directory: raw.working_directory,
            path_style: raw.path_style.unwrap_or_default(),
            environment: raw.environment,
            paths: raw.paths,
        }
    }

    /// The configured framework binary, or the first of
    /// [`FRAMEWORK_CANDIDATES`] present under `cwd`.
    pub fn framework_binary(&self, cwd: &Path, fs: &dyn FileSystem) -> String {
        if let Some(bin) = self.phpunit.as_deref().filter(|b| !b.trim().is_empty()) {
            return bin.to_string();
        }

        FRAMEWORK_CANDIDATES
            .iter()
            .find(|candidate| fs.is_file(&cwd.join(candidate)))
            .map(|found| {
                debug!(framework = %found, "detected framework binary");
                found.to_string()
            })
            .unwrap_or_else(|| DEFAULT_FRAMEWORK.to_string())
    }

    /// Directory the process starts in: `working_directory` (relative to
    /// `cwd` when not absolute) or `cwd` itself.
    pub fn working_directory(&self, cwd: &Path) -> PathBuf {
        match &self.working_directory {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        }
    }
}

impl ExecutionContext {
    /// Build the per-run context from configuration, probing the real
    /// filesystem for the framework binary.
    pub fn from_config(config: &ConfigFile, cwd: &Path) -> Self {
        Self::from_config_with_fs(config, cwd, &RealFileSystem)
    }

    pub fn from_config_with_fs(config: &ConfigFile, cwd: &Path, fs: &dyn FileSystem) -> Self {
        let working_directory = config.working_directory(cwd);
        Self {
            runtime_binary: config.php.clone(),
            framework_binary: config.framework_binary(&working_directory, fs),
            command_template: config.command.clone(),
            runtime_args: config.php_args.clone(),
            extra_args: config.args.clone(),
            environment: config.environment.clone(),
            working_directory,
            path_style: config.path_style,
            path_mappings: config.paths.clone(),
        }
    }
}
