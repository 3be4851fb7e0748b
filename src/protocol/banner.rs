// src/protocol/banner.rs

//! Plain-text lines PHPUnit prints around the service messages.

use std::sync::LazyLock;

use regex::Regex;

use crate::protocol::events::{
    ConfigurationInfo, DurationInfo, ProtocolEvent, ResultSummary, RuntimeInfo, VersionInfo,
};

static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:ParaTest\s+v?(?P<paratest>\d[\w.\-]*)\s+upon\s+)?PHPUnit\s+(?P<phpunit>\d[\w.\-]*)")
        .expect("version pattern is valid")
});

static RUNTIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Runtime:\s+(?P<runtime>.+?)\s*$").expect("runtime pattern is valid")
});

static CONFIGURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Configuration:\s+(?P<path>.+?)\s*$").expect("configuration pattern is valid")
});

static TIME_AND_MEMORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Time:\s*(?P<time>[^,]+?)\s*,\s*Memory:\s*(?P<memory>.+?)\s*$")
        .expect("time pattern is valid")
});

static SHORT_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^OK\s+\((?P<tests>\d+)\s+tests?,\s+(?P<assertions>\d+)\s+assertions?\)")
        .expect("short summary pattern is valid")
});

static LONG_SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Tests:\s*\d+\s*,").expect("long summary pattern is valid"));

static SUMMARY_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<key>[A-Za-z][A-Za-z ]*?):\s*(?P<value>\d+)").expect("count pattern is valid")
});

/// Decode one plain-text line, or `None` when it is not a known banner.
pub fn parse_banner(line: &str) -> Option<ProtocolEvent> {
    let text = line.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = VERSION.captures(text) {
        return Some(ProtocolEvent::TestVersion(VersionInfo {
            phpunit: caps["phpunit"].trim_end_matches('.').to_string(),
            paratest: caps
                .name("paratest")
                .map(|m| m.as_str().trim_end_matches('.').to_string()),
            text: text.to_string(),
        }));
    }

    if let Some(caps) = RUNTIME.captures(text) {
        return Some(ProtocolEvent::TestRuntime(RuntimeInfo {
            runtime: caps["runtime"].to_string(),
            text: text.to_string(),
        }));
    }

    if let Some(caps) = CONFIGURATION.captures(text) {
        return Some(ProtocolEvent::TestConfiguration(ConfigurationInfo {
            path: caps["path"].to_string(),
            text: text.to_string(),
        }));
    }

    if let Some(caps) = TIME_AND_MEMORY.captures(text) {
        return Some(ProtocolEvent::TestDuration(DurationInfo {
            time: caps["time"].to_string(),
            memory: caps["memory"].to_string(),
            text: text.to_string(),
        }));
    }

    if let Some(caps) = SHORT_SUMMARY.captures(text) {
        return Some(ProtocolEvent::TestResultSummary(ResultSummary {
            tests: caps["tests"].parse().ok(),
            assertions: caps["assertions"].parse().ok(),
            text: text.to_string(),
            ..ResultSummary::default()
        }));
    }

    if LONG_SUMMARY.is_match(text) {
        return Some(ProtocolEvent::TestResultSummary(parse_long_summary(text)));
    }

    None
}

fn parse_long_summary(text: &str) -> ResultSummary {
    let mut summary = ResultSummary {
        text: text.to_string(),
        ..ResultSummary::default()
    };

    for caps in SUMMARY_COUNT.captures_iter(text) {
        let value: Option<u64> = caps["value"].parse().ok();
        let key = caps["key"].trim().to_lowercase();
        let slot = match key.as_str() {
            "tests" => &mut summary.tests,
            "assertions" => &mut summary.assertions,
            "errors" => &mut summary.errors,
            "failures" => &mut summary.failures,
            "warnings" => &mut summary.warnings,
            "skipped" => &mut summary.skipped,
            "incomplete" => &mut summary.incomplete,
            "risky" => &mut summary.risky,
            "deprecations" | "phpunit deprecations" => &mut summary.deprecations,
            "notices" => &mut summary.notices,
            _ => continue,
        };
        *slot = Some(slot.unwrap_or(0) + value.unwrap_or(0));
    }

    summary
}
