// src/paths/replacer.rs

//! Bidirectional local ⇄ remote path translation.
//!
//! Translation is best-effort: a path outside every registered mapping is
//! returned unchanged (apart from separator normalization), and callers must
//! treat it as opaque.

use tracing::{debug, warn};

use crate::paths::has_drive_letter;
use crate::paths::variables::PathVariables;
use crate::types::PathStyle;

/// Schemes that wrap a path inside a PHPUnit/Pest location hint.
const LOCATION_SCHEMES: [&str; 2] = ["php_qn://", "pest_qn://"];

/// Stream wrapper Composer uses for proxied vendor binaries.
const COMPOSER_WRAPPER: &str = "phpvfscomposer://";

/// One resolved `local → remote` prefix pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    pub local: String,
    pub remote: String,
}

/// Immutable translator between local paths and the paths the test runner
/// sees.
#[derive(Debug, Clone)]
pub struct PathReplacer {
    variables: PathVariables,
    /// Sorted by local prefix length, longest first.
    by_local: Vec<PathMapping>,
    /// Sorted by remote prefix length, longest first.
    by_remote: Vec<PathMapping>,
}

impl PathReplacer {
    /// Build a replacer from raw `(local, remote)` pairs as they appear in
    /// configuration. `${...}` variables are expanded on both sides. Pairs
    /// where either side is empty, blank or `/` are ignored: applying them
    /// would rewrite every path.
    pub fn new<I, K, V>(variables: PathVariables, mappings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut resolved = Vec::new();
        for (local, remote) in mappings {
            let local = variables.substitute(local.as_ref());
            let remote = variables.substitute(remote.as_ref());

            if is_inert(&local) || is_inert(&remote) {
                warn!(%local, %remote, "ignoring path mapping that would match every path");
                continue;
            }

            resolved.push(PathMapping {
                local: trim_trailing_separators(&local).to_string(),
                remote: trim_trailing_separators(&remote.replace('\\', "/")).to_string(),
            });
        }

        let mut by_local = resolved.clone();
        by_local.sort_by(|a, b| b.local.len().cmp(&a.local.len()));
        let mut by_remote = resolved;
        by_remote.sort_by(|a, b| b.remote.len().cmp(&a.remote.len()));

        debug!(mappings = by_local.len(), "path replacer ready");

        Self {
            variables,
            by_local,
            by_remote,
        }
    }

    /// A replacer without mappings: only variable expansion and separator
    /// normalization apply.
    pub fn identity(variables: PathVariables) -> Self {
        Self::new(variables, std::iter::empty::<(String, String)>())
    }

    pub fn variables(&self) -> &PathVariables {
        &self.variables
    }

    pub fn has_mappings(&self) -> bool {
        !self.by_local.is_empty()
    }

    /// Translate a local path into the runner's execution context.
    pub fn to_remote(&self, path: &str) -> String {
        let style = self.variables.style();
        let expanded = self.variables.substitute(path);
        let path = resolve_dot_prefix(&expanded, self.variables.workspace_root(), style);

        let translated = self
            .by_local
            .iter()
            .find_map(|m| {
                strip_local_prefix(&path, &m.local, style)
                    .map(|rest| format!("{}{}", m.remote, rest.replace('\\', "/")))
            })
            .unwrap_or(path);

        if has_drive_letter(&translated) {
            translated
        } else {
            translated.replace('\\', "/")
        }
    }

    /// Translate a path reported by the runner back into a local path.
    pub fn to_local(&self, path: &str) -> String {
        let unwrapped = strip_composer_wrapper(path);
        let (scheme, body) = split_location_scheme(&unwrapped);

        let translated = self
            .by_remote
            .iter()
            .find_map(|m| {
                strip_remote_prefix(body, &m.remote).map(|rest| format!("{}{}", m.local, rest))
            })
            .unwrap_or_else(|| body.to_string());

        let resolved = resolve_dot_prefix(
            &translated,
            self.variables.workspace_root(),
            self.variables.style(),
        );

        let localized = if has_drive_letter(&resolved) {
            resolved.replace('/', "\\")
        } else {
            resolved
        };

        format!("{scheme}{localized}")
    }
}

fn is_inert(side: &str) -> bool {
    let trimmed = side.trim();
    trimmed.is_empty() || trimmed == "/" || trimmed == "\\"
}

fn trim_trailing_separators(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() { path } else { trimmed }
}

/// `./foo` → `<root>/foo`, `.` → `<root>`.
fn resolve_dot_prefix(path: &str, root: &str, style: PathStyle) -> String {
    if path == "." {
        return root.to_string();
    }
    match path.strip_prefix("./").or_else(|| path.strip_prefix(".\\")) {
        Some(rest) => {
            let root = root.trim_end_matches(['/', '\\']);
            format!("{root}{}{rest}", style.separator())
        }
        None => path.to_string(),
    }
}

/// Remove every `phpvfscomposer://` wrapper, case-insensitively.
fn strip_composer_wrapper(path: &str) -> String {
    let lower = path.to_ascii_lowercase();
    if !lower.contains(COMPOSER_WRAPPER) {
        return path.to_string();
    }
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    let mut rest_lower = lower.as_str();
    while let Some(idx) = rest_lower.find(COMPOSER_WRAPPER) {
        out.push_str(&rest[..idx]);
        rest = &rest[idx + COMPOSER_WRAPPER.len()..];
        rest_lower = &rest_lower[idx + COMPOSER_WRAPPER.len()..];
    }
    out.push_str(rest);
    out
}

fn split_location_scheme(path: &str) -> (&str, &str) {
    for scheme in LOCATION_SCHEMES {
        if let Some(body) = path.strip_prefix(scheme) {
            return (scheme, body);
        }
    }
    ("", path)
}

/// Strip `prefix` from a local `path` on a component boundary, comparing
/// separators loosely (and case-insensitively on Windows). Returns the
/// remainder, starting with its separator.
fn strip_local_prefix<'a>(path: &'a str, prefix: &str, style: PathStyle) -> Option<&'a str> {
    if path.len() < prefix.len() || !path.is_char_boundary(prefix.len()) {
        return None;
    }
    let (head, rest) = path.split_at(prefix.len());
    let equal = match style {
        PathStyle::Windows => {
            head.replace('\\', "/").eq_ignore_ascii_case(&prefix.replace('\\', "/"))
        }
        PathStyle::Posix => head.replace('\\', "/") == prefix.replace('\\', "/"),
    };
    if equal && (rest.is_empty() || rest.starts_with(['/', '\\'])) {
        Some(rest)
    } else {
        None
    }
}

/// Strip a remote (always POSIX) prefix on a component boundary.
fn strip_remote_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
}
