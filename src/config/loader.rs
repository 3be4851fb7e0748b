// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{RelayError, Result};
use crate::fs::FileSystem;

/// Name of the config file looked up in the project directory.
pub const DEFAULT_CONFIG_FILE: &str = "phpunit-relay.toml";

/// Read and deserialize a config file without validating it.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs
        .read_to_string(path)
        .map_err(|e| RelayError::ConfigError(format!("{e:#}")))?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a config file and validate it.
pub fn load_and_validate(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(fs, &path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Load `explicit` if given (it must exist), otherwise the default file in
/// `cwd` if present, otherwise an all-defaults config.
pub fn load_optional(fs: &dyn FileSystem, explicit: Option<&Path>, cwd: &Path) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(fs, path);
    }

    let path = default_config_path(cwd);
    if fs.is_file(&path) {
        debug!(path = %path.display(), "loading default config file");
        load_and_validate(fs, path)
    } else {
        debug!(path = %path.display(), "no config file; using defaults");
        Ok(ConfigFile::default())
    }
}

/// `phpunit-relay.toml` in `cwd`.
pub fn default_config_path(cwd: &Path) -> PathBuf {
    cwd.join(DEFAULT_CONFIG_FILE)
}
