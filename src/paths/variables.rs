// src/paths/variables.rs

//! `${...}` path variables.

use std::path::Path;

use crate::types::PathStyle;

pub const PWD: &str = "${PWD}";
pub const WORKSPACE_FOLDER: &str = "${workspaceFolder}";
pub const WORKSPACE_FOLDER_BASENAME: &str = "${workspaceFolderBasename}";
pub const USER_HOME: &str = "${userHome}";
pub const PATH_SEPARATOR: &str = "${pathSeparator}";

/// Every token [`PathVariables::substitute`] understands.
pub const TOKENS: [&str; 5] = [
    PWD,
    WORKSPACE_FOLDER,
    WORKSPACE_FOLDER_BASENAME,
    USER_HOME,
    PATH_SEPARATOR,
];

/// Drive letter prefixed to rooted-but-driveless paths on Windows.
const SYNTHETIC_DRIVE: &str = "C:";

/// Concrete values for the path variables of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathVariables {
    cwd: String,
    workspace_root: String,
    home: String,
    style: PathStyle,
}

impl PathVariables {
    pub fn new(
        cwd: impl Into<String>,
        workspace_root: impl Into<String>,
        home: impl Into<String>,
        style: PathStyle,
    ) -> Self {
        Self {
            cwd: normalize_root(cwd.into(), style),
            workspace_root: normalize_root(workspace_root.into(), style),
            home: normalize_root(home.into(), style),
            style,
        }
    }

    /// Variables for a project rooted at `cwd`. The user's home directory
    /// comes from the OS; when it cannot be determined the `${userHome}`
    /// variable expands to an empty string.
    pub fn detect(cwd: &Path, style: PathStyle) -> Self {
        let cwd = cwd.to_string_lossy().into_owned();
        let home = dirs::home_dir()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(cwd.clone(), cwd, home, style)
    }

    /// True if `token` (including `${` and `}`) is a path variable.
    pub fn is_known(token: &str) -> bool {
        TOKENS.contains(&token)
    }

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn workspace_root(&self) -> &str {
        &self.workspace_root
    }

    pub fn style(&self) -> PathStyle {
        self.style
    }

    /// Last component of the workspace root.
    pub fn workspace_basename(&self) -> &str {
        self.workspace_root
            .trim_end_matches(['/', '\\'])
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or("")
    }

    /// Token → value pairs, in no particular order.
    pub fn entries(&self) -> [(&'static str, String); 5] {
        [
            (PWD, self.cwd.clone()),
            (WORKSPACE_FOLDER, self.workspace_root.clone()),
            (WORKSPACE_FOLDER_BASENAME, self.workspace_basename().to_string()),
            (USER_HOME, self.home.clone()),
            (PATH_SEPARATOR, self.style.separator().to_string()),
        ]
    }

    /// Replace every occurrence of every known token in `input`.
    ///
    /// Values never contain a token themselves, so applying this to its own
    /// output is a no-op.
    pub fn substitute(&self, input: &str) -> String {
        if !input.contains("${") {
            return input.to_string();
        }
        self.entries()
            .iter()
            .fold(input.to_string(), |acc, (token, value)| {
                acc.replace(token, value)
            })
    }
}

/// On Windows, a path starting with a single bare separator gets a drive
/// letter so that later joins do not produce `\foo`-style paths. UNC paths
/// (`\\server\share`) are left alone.
fn normalize_root(path: String, style: PathStyle) -> String {
    if style != PathStyle::Windows {
        return path;
    }
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some(a), Some(b)) if is_sep(a) && is_sep(b) => path,
        (Some(a), _) if is_sep(a) => format!("{SYNTHETIC_DRIVE}{path}"),
        _ => path,
    }
}

fn is_sep(c: char) -> bool {
    c == '/' || c == '\\'
}
