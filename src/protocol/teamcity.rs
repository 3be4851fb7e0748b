// src/protocol/teamcity.rs

//! Tokenizer for `##teamcity[name key='value' ...]` service messages.

/// Marker that starts every service message.
pub const MARKER: &str = "##teamcity[";

/// A tokenized service message with unescaped attribute values, in the
/// order they appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMessage {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl ServiceMessage {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Tokenize the service message on `line`, if there is one. Returns `None`
/// for lines without the marker and for malformed messages.
pub fn parse_service_message(line: &str) -> Option<ServiceMessage> {
    let start = line.find(MARKER)? + MARKER.len();
    let mut chars = line[start..].chars().peekable();

    skip_whitespace(&mut chars);
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() || c == ']' {
            break;
        }
        name.push(c);
        chars.next();
    }
    if name.is_empty() {
        return None;
    }

    let mut attributes = Vec::new();
    loop {
        skip_whitespace(&mut chars);
        match chars.next()? {
            ']' => break,
            first => {
                let mut key = String::from(first);
                loop {
                    match chars.next()? {
                        '=' => break,
                        c if c.is_whitespace() => return None,
                        c => key.push(c),
                    }
                }
                if chars.next()? != '\'' {
                    return None;
                }
                let mut raw = String::new();
                loop {
                    match chars.next()? {
                        '|' => {
                            raw.push('|');
                            raw.push(chars.next()?);
                        }
                        '\'' => break,
                        c => raw.push(c),
                    }
                }
                attributes.push((key, unescape(&raw)));
            }
        }
    }

    Some(ServiceMessage { name, attributes })
}

fn skip_whitespace(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

/// Undo TeamCity value escaping: `||`, `|'`, `|n`, `|r`, `|[`, `|]` and
/// `|0xXXXX` code points.
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '|' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('0') => {
                let rest = chars.as_str();
                match decode_code_point(rest) {
                    Some((decoded, consumed)) => {
                        out.push(decoded);
                        chars = rest[consumed..].chars();
                    }
                    None => out.push('0'),
                }
            }
            Some(other) => out.push(other),
            None => out.push('|'),
        }
    }
    out
}

/// `x0085` → U+0085. `rest` starts right after the `|0`.
fn decode_code_point(rest: &str) -> Option<(char, usize)> {
    let hex = rest.strip_prefix('x')?.get(..4)?;
    let code = u32::from_str_radix(hex, 16).ok()?;
    Some((char::from_u32(code)?, 5))
}

/// Apply TeamCity value escaping.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '|' => out.push_str("||"),
            '\'' => out.push_str("|'"),
            '\n' => out.push_str("|n"),
            '\r' => out.push_str("|r"),
            '[' => out.push_str("|["),
            ']' => out.push_str("|]"),
            c => out.push(c),
        }
    }
    out
}
