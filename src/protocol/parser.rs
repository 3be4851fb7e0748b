// src/protocol/parser.rs

//! Line → event decoding. Stateless: each line is decoded on its own.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::protocol::banner::parse_banner;
use crate::protocol::events::{
    Comparison, FaultFrame, Location, ProtocolEvent, TestCount, TestFault, TestFinished,
    TestStarted,
};
use crate::protocol::teamcity::{ServiceMessage, parse_service_message};

const LOCATION_SCHEMES: [&str; 2] = ["php_qn://", "pest_qn://"];

static DATA_SET_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+with data set\s+.*$").expect("data set pattern is valid"));

static DETAIL_FRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<file>.+):(?P<line>\d+)$").expect("frame pattern is valid"));

/// Decode one line of runner output into at most one event.
pub fn parse_line(line: &str) -> Option<ProtocolEvent> {
    match parse_service_message(line) {
        Some(message) => event_from_message(&message),
        None => parse_banner(line),
    }
}

fn event_from_message(message: &ServiceMessage) -> Option<ProtocolEvent> {
    let name = || message.get("name").unwrap_or_default().to_string();
    let flow_id = || message.get("flowId").map(str::to_string);

    let event = match message.name.as_str() {
        "testCount" => ProtocolEvent::TestCount(TestCount {
            count: message.get("count")?.trim().parse().ok()?,
            flow_id: flow_id(),
        }),
        "testSuiteStarted" | "testStarted" => {
            let started = TestStarted {
                name: name(),
                flow_id: flow_id(),
                location: message.get("locationHint").and_then(parse_location),
            };
            if message.name == "testStarted" {
                ProtocolEvent::TestStarted(started)
            } else {
                ProtocolEvent::TestSuiteStarted(started)
            }
        }
        "testFinished" | "testSuiteFinished" => {
            let finished = TestFinished {
                name: name(),
                flow_id: flow_id(),
                duration_ms: message.get("duration").and_then(parse_duration),
            };
            if message.name == "testFinished" {
                ProtocolEvent::TestFinished(finished)
            } else {
                ProtocolEvent::TestSuiteFinished(finished)
            }
        }
        "testFailed" | "testIgnored" => {
            let fault = TestFault {
                name: name(),
                flow_id: flow_id(),
                message: message.get("message").unwrap_or_default().to_string(),
                details: message.get("details").map(parse_details).unwrap_or_default(),
                duration_ms: message.get("duration").and_then(parse_duration),
                comparison: parse_comparison(message),
            };
            if message.name == "testFailed" {
                ProtocolEvent::TestFailed(fault)
            } else {
                ProtocolEvent::TestIgnored(fault)
            }
        }
        other => {
            trace!(message = other, "ignoring service message");
            return None;
        }
    };

    Some(event)
}

/// Decode `php_qn://<file>::<\Class>[::<method>]` or
/// `pest_qn://<file>::<description>`.
pub fn parse_location(hint: &str) -> Option<Location> {
    let (scheme, body) = LOCATION_SCHEMES
        .iter()
        .find_map(|s| hint.strip_prefix(s).map(|body| (*s, body)))?;
    let (file, member) = body.split_once("::")?;

    let id = if scheme == "pest_qn://" {
        format!("{file}::{member}")
    } else {
        member.trim_start_matches('\\').to_string()
    };
    let test_id = strip_data_set(&id);

    Some(Location {
        hint: hint.to_string(),
        file: file.to_string(),
        id,
        test_id,
    })
}

/// `NS\T::test_a with data set #0` → `NS\T::test_a`.
pub fn strip_data_set(id: &str) -> String {
    DATA_SET_SUFFIX.replace(id, "").into_owned()
}

/// PHPUnit reports whole milliseconds; fractional values are rounded.
fn parse_duration(value: &str) -> Option<u64> {
    let value = value.trim();
    value.parse::<u64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u64)
    })
}

fn parse_details(details: &str) -> Vec<FaultFrame> {
    details
        .lines()
        .filter_map(|line| {
            let caps = DETAIL_FRAME.captures(line.trim())?;
            Some(FaultFrame {
                file: caps["file"].to_string(),
                line: caps["line"].parse().ok()?,
            })
        })
        .collect()
}

fn parse_comparison(message: &ServiceMessage) -> Option<Comparison> {
    let kind = message.get("type");
    let actual = message.get("actual");
    let expected = message.get("expected");
    if kind.is_none() && actual.is_none() && expected.is_none() {
        return None;
    }
    Some(Comparison {
        kind: kind.unwrap_or("comparisonFailure").to_string(),
        actual: actual.unwrap_or_default().to_string(),
        expected: expected.unwrap_or_default().to_string(),
    })
}
