// src/paths/mod.rs

//! Local ⇄ remote path translation.
//!
//! - [`variables`] expands `${...}` path variables (`${workspaceFolder}`,
//!   `${userHome}`, ...) for the current invocation.
//! - [`replacer`] maps local paths to the paths seen by the test runner in
//!   its execution context (SSH host, container) and back.
//!
//! Both are built once per run from configuration and are read-only from
//! then on.

pub mod replacer;
pub mod variables;

pub use replacer::{PathMapping, PathReplacer};
pub use variables::PathVariables;

/// True for paths like `C:\foo` or `c:/foo`.
pub fn has_drive_letter(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
