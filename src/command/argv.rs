// src/command/argv.rs

//! Quote-aware splitting of command strings into argv.
//!
//! Only quotes group characters; backslashes are literal so that Windows
//! paths such as `C:\tools\php.exe` survive untouched. Quotes are removed
//! from the resulting arguments.

use crate::errors::{RelayError, Result};

/// Split `input` on whitespace, honouring `'...'` and `"..."` groups.
pub fn split(input: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(RelayError::CommandError(format!(
            "unterminated {q} quote in command: {input}"
        )));
    }
    if in_token {
        args.push(current);
    }
    Ok(args)
}

/// Whether `arg` has to be quoted to stay a single shell word.
pub fn needs_quoting(arg: &str) -> bool {
    arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '\\' | '$' | '`' | '(' | ')' | '|' | '&' | ';' | '<' | '>' | '*' | '?'))
}

/// Quote `arg` for a POSIX shell, using single quotes.
pub fn quote_posix(arg: &str) -> String {
    if !needs_quoting(arg) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Render an argv as one human-readable line (for logs and dry runs).
pub fn join(args: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    args.into_iter()
        .map(|a| quote_posix(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}
