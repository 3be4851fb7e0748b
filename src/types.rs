use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Path syntax of the machine the relay runs on.
///
/// Remote paths are always treated as POSIX; this only controls how local
/// paths are compared and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    Posix,
    Windows,
}

impl PathStyle {
    /// Path style of the host this binary was compiled for.
    pub fn host() -> Self {
        if cfg!(windows) {
            PathStyle::Windows
        } else {
            PathStyle::Posix
        }
    }

    pub fn separator(self) -> char {
        match self {
            PathStyle::Posix => '/',
            PathStyle::Windows => '\\',
        }
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        PathStyle::host()
    }
}

impl FromStr for PathStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "posix" | "unix" => Ok(PathStyle::Posix),
            "windows" | "win32" => Ok(PathStyle::Windows),
            other => Err(format!(
                "invalid path style: {other} (expected \"posix\" or \"windows\")"
            )),
        }
    }
}

/// Which output pipe of the child process a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
}
