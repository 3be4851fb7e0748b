// src/protocol/events.rs

//! Typed events decoded from runner output, one variant per frame kind.

use serde::Serialize;

use crate::protocol::parser::parse_location;

/// Closed set of event kinds, for dispatch without matching payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    TestVersion,
    TestRuntime,
    TestConfiguration,
    TestCount,
    TestSuiteStarted,
    TestStarted,
    TestFinished,
    TestFailed,
    TestIgnored,
    TestSuiteFinished,
    TestDuration,
    TestResultSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ProtocolEvent {
    TestVersion(VersionInfo),
    TestRuntime(RuntimeInfo),
    TestConfiguration(ConfigurationInfo),
    TestCount(TestCount),
    TestSuiteStarted(TestStarted),
    TestStarted(TestStarted),
    TestFinished(TestFinished),
    TestFailed(TestFault),
    TestIgnored(TestFault),
    TestSuiteFinished(TestFinished),
    TestDuration(DurationInfo),
    TestResultSummary(ResultSummary),
}

impl ProtocolEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ProtocolEvent::TestVersion(_) => EventKind::TestVersion,
            ProtocolEvent::TestRuntime(_) => EventKind::TestRuntime,
            ProtocolEvent::TestConfiguration(_) => EventKind::TestConfiguration,
            ProtocolEvent::TestCount(_) => EventKind::TestCount,
            ProtocolEvent::TestSuiteStarted(_) => EventKind::TestSuiteStarted,
            ProtocolEvent::TestStarted(_) => EventKind::TestStarted,
            ProtocolEvent::TestFinished(_) => EventKind::TestFinished,
            ProtocolEvent::TestFailed(_) => EventKind::TestFailed,
            ProtocolEvent::TestIgnored(_) => EventKind::TestIgnored,
            ProtocolEvent::TestSuiteFinished(_) => EventKind::TestSuiteFinished,
            ProtocolEvent::TestDuration(_) => EventKind::TestDuration,
            ProtocolEvent::TestResultSummary(_) => EventKind::TestResultSummary,
        }
    }

    /// Apply `f` to every filesystem path the event carries.
    pub fn map_paths(&mut self, f: impl Fn(&str) -> String) {
        match self {
            ProtocolEvent::TestSuiteStarted(started) | ProtocolEvent::TestStarted(started) => {
                if let Some(location) = &mut started.location {
                    location.relocate(&f);
                }
            }
            ProtocolEvent::TestFailed(fault) | ProtocolEvent::TestIgnored(fault) => {
                for frame in &mut fault.details {
                    frame.file = f(&frame.file);
                }
            }
            ProtocolEvent::TestConfiguration(info) => {
                info.path = f(&info.path);
            }
            _ => {}
        }
    }
}

/// `PHPUnit 10.5.9 by Sebastian Bergmann and contributors.`, optionally
/// preceded by a ParaTest banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub phpunit: String,
    pub paratest: Option<String>,
    pub text: String,
}

/// `Runtime:       PHP 8.3.1`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeInfo {
    pub runtime: String,
    pub text: String,
}

/// `Configuration: /app/phpunit.xml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationInfo {
    pub path: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCount {
    pub count: u64,
    pub flow_id: Option<String>,
}

/// Source location decoded from a `locationHint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// The raw hint, e.g. `php_qn:///app/tests/T.php::\NS\T::test_a`.
    pub hint: String,
    pub file: String,
    /// Canonical id, e.g. `NS\T::test_a with data set #0`.
    pub id: String,
    /// Id of the declaring test, without any data-set suffix.
    pub test_id: String,
}

impl Location {
    /// Translate the file with `f` and rebuild the hint and the ids from it,
    /// so a Pest id (`<file>::<description>`) names the translated file too.
    pub fn relocate(&mut self, f: impl Fn(&str) -> String) {
        let file = f(&self.file);
        let rebuilt = self.hint.find("://").and_then(|i| {
            let (scheme, body) = self.hint.split_at(i + 3);
            let member = body.strip_prefix(self.file.as_str())?;
            parse_location(&format!("{scheme}{file}{member}"))
        });
        match rebuilt {
            Some(location) => *self = location,
            None => self.file = file,
        }
    }
}

/// Payload of `testStarted` and `testSuiteStarted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStarted {
    pub name: String,
    pub flow_id: Option<String>,
    pub location: Option<Location>,
}

/// Payload of `testFinished` and `testSuiteFinished`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFinished {
    pub name: String,
    pub flow_id: Option<String>,
    pub duration_ms: Option<u64>,
}

/// One `file:line` entry of a fault's stack details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaultFrame {
    pub file: String,
    pub line: u32,
}

/// Expected/actual payload of a `comparisonFailure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    #[serde(rename = "type")]
    pub kind: String,
    pub actual: String,
    pub expected: String,
}

/// Payload of `testFailed` and `testIgnored`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFault {
    pub name: String,
    pub flow_id: Option<String>,
    pub message: String,
    pub details: Vec<FaultFrame>,
    pub duration_ms: Option<u64>,
    pub comparison: Option<Comparison>,
}

/// `Time: 00:00.049, Memory: 6.00 MB`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DurationInfo {
    pub time: String,
    pub memory: String,
    pub text: String,
}

/// Final summary line, short (`OK (3 tests, 5 assertions)`) or long
/// (`Tests: 3, Assertions: 5, Failures: 1.`) form. Counts absent from the
/// line are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub tests: Option<u64>,
    pub assertions: Option<u64>,
    pub errors: Option<u64>,
    pub failures: Option<u64>,
    pub warnings: Option<u64>,
    pub skipped: Option<u64>,
    pub incomplete: Option<u64>,
    pub risky: Option<u64>,
    pub deprecations: Option<u64>,
    pub notices: Option<u64>,
    pub text: String,
}
