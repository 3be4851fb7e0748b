// src/command/filter_codec.rs

//! Transport encoding for `--filter=<regex>` arguments.
//!
//! The filter is the one argument that routinely carries shell
//! metacharacters, and it may be re-parsed by up to three shells (local,
//! SSH remote, inner `sh -c`). [`encode`] swaps the value for its base64
//! form before the command string is assembled; [`decode`] restores it
//! argument by argument, adding the one layer of quoting the next shell
//! strips. When an `sh -c` script travels over ssh the builder quotes the
//! whole script again for the extra hop.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

const FILTER_PREFIX: &str = "--filter=";

static ENCODED_FILTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)--filter=([A-Za-z0-9+/]*={0,2})").expect("filter pattern is valid")
});

/// Encode every `--filter=<value>` argument.
pub fn encode(args: &[String]) -> Vec<String> {
    args.iter().map(|a| encode_arg(a)).collect()
}

pub fn encode_arg(arg: &str) -> String {
    match arg.strip_prefix(FILTER_PREFIX) {
        Some(value) => format!("{FILTER_PREFIX}{}", STANDARD.encode(value)),
        None => arg.to_string(),
    }
}

/// Decode filters produced by [`encode`], wherever they appear inside each
/// argument. With `needs_outer_quoting` the decoded value is wrapped in one
/// layer of shell quoting.
pub fn decode(args: &[String], needs_outer_quoting: bool) -> Vec<String> {
    args.iter()
        .map(|a| decode_arg(a, needs_outer_quoting))
        .collect()
}

pub fn decode_arg(arg: &str, needs_outer_quoting: bool) -> String {
    if !arg.contains(FILTER_PREFIX) {
        return arg.to_string();
    }

    let mut out = String::with_capacity(arg.len());
    let mut last = 0;
    for caps in ENCODED_FILTER.captures_iter(arg) {
        let Some(value) = caps.get(1) else {
            continue;
        };
        // The value must end the word.
        if arg[value.end()..].chars().next().is_some_and(|c| !c.is_whitespace()) {
            continue;
        }
        let Some(decoded) = decode_value(value.as_str()) else {
            continue;
        };
        out.push_str(&arg[last..value.start()]);
        if needs_outer_quoting {
            out.push_str(&quote_filter(&decoded));
        } else {
            out.push_str(&decoded);
        }
        last = value.end();
    }
    out.push_str(&arg[last..]);
    out
}

/// Only canonical base64 of valid UTF-8 counts as one of ours.
fn decode_value(value: &str) -> Option<String> {
    let bytes = STANDARD.decode(value).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    (STANDARD.encode(decoded.as_bytes()) == value).then_some(decoded)
}

/// Single quotes unless the value contains one; then double quotes with the
/// characters a POSIX shell interprets inside them escaped.
pub fn quote_filter(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
