// src/config/validate.rs

use std::sync::LazyLock;

use regex::Regex;

use crate::command::builder::PLACEHOLDERS;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{RelayError, Result};
use crate::paths::variables::PathVariables;

static TEMPLATE_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{[^}]*\}").expect("template variable pattern is valid"));

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = RelayError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_binaries(cfg)?;
    validate_command(&cfg.command)?;
    validate_paths(cfg)?;
    Ok(())
}

fn validate_binaries(cfg: &RawConfigFile) -> Result<()> {
    if cfg.php.trim().is_empty() {
        return Err(RelayError::ConfigError("`php` must not be empty".to_string()));
    }
    Ok(())
}

fn validate_command(command: &str) -> Result<()> {
    if let Some(quote) = unbalanced_quote(command) {
        return Err(RelayError::ConfigError(format!(
            "`command` has an unterminated {quote} quote: {command}"
        )));
    }

    for found in TEMPLATE_VARIABLE.find_iter(command) {
        let name = found.as_str();
        if !PLACEHOLDERS.contains(&name) && !PathVariables::is_known(name) {
            return Err(RelayError::ConfigError(format!(
                "`command` references unknown variable '{name}'"
            )));
        }
    }
    Ok(())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<()> {
    for (local, remote) in cfg.paths.iter() {
        if local.trim().is_empty() {
            return Err(RelayError::ConfigError(format!(
                "[paths] has an empty local path (remote '{remote}')"
            )));
        }
    }
    Ok(())
}

/// The quote character left open at the end of `s`, if any.
fn unbalanced_quote(s: &str) -> Option<char> {
    let mut open: Option<char> = None;
    for c in s.chars() {
        match (open, c) {
            (None, '\'' | '"') => open = Some(c),
            (Some(q), c) if c == q => open = None,
            _ => {}
        }
    }
    open
}
