// tests/protocol_parser.rs

mod common;
use crate::common::builders::FrameBuilder;

use phpunit_relay::protocol::teamcity::{escape, parse_service_message, unescape};
use phpunit_relay::protocol::{EventKind, FaultFrame, ProtocolEvent, parse_line};

#[test]
fn started_frame_decodes_php_qn_location() {
    let line = r"##teamcity[testStarted name='test_passed' locationHint='php_qn:///app/tests/T.php::\NS\T::test_passed' flowId='1']";

    let Some(ProtocolEvent::TestStarted(started)) = parse_line(line) else {
        panic!("expected testStarted");
    };
    assert_eq!(started.name, "test_passed");
    assert_eq!(started.flow_id.as_deref(), Some("1"));

    let location = started.location.expect("location");
    assert_eq!(location.file, "/app/tests/T.php");
    assert_eq!(location.id, r"NS\T::test_passed");
    assert_eq!(location.test_id, r"NS\T::test_passed");
}

#[test]
fn data_set_suffix_is_stripped_from_test_id() {
    let line = FrameBuilder::started("test_sum with data set #1")
        .location(r"php_qn:///app/tests/MathTest.php::\Tests\MathTest::test_sum with data set #1")
        .build();

    let Some(ProtocolEvent::TestStarted(started)) = parse_line(&line) else {
        panic!("expected testStarted");
    };
    let location = started.location.expect("location");
    assert_eq!(location.id, r"Tests\MathTest::test_sum with data set #1");
    assert_eq!(location.test_id, r"Tests\MathTest::test_sum");
}

#[test]
fn suite_location_without_method() {
    let line = FrameBuilder::suite_started(r"Tests\MathTest")
        .location(r"php_qn:///app/tests/MathTest.php::\Tests\MathTest")
        .build();

    let Some(ProtocolEvent::TestSuiteStarted(started)) = parse_line(&line) else {
        panic!("expected testSuiteStarted");
    };
    assert_eq!(started.location.expect("location").id, r"Tests\MathTest");
}

#[test]
fn pest_location_keeps_file_in_id() {
    let line = FrameBuilder::started("it adds")
        .location("pest_qn:///app/tests/Unit/MathTest.php::it adds")
        .build();

    let Some(ProtocolEvent::TestStarted(started)) = parse_line(&line) else {
        panic!("expected testStarted");
    };
    let location = started.location.expect("location");
    assert_eq!(location.file, "/app/tests/Unit/MathTest.php");
    assert_eq!(location.id, "/app/tests/Unit/MathTest.php::it adds");
}

#[test]
fn finished_frame_carries_duration() {
    let line = "##teamcity[testFinished name='test_passed' duration='12' flowId='1']";

    let Some(ProtocolEvent::TestFinished(finished)) = parse_line(line) else {
        panic!("expected testFinished");
    };
    assert_eq!(finished.duration_ms, Some(12));
    assert_eq!(finished.flow_id.as_deref(), Some("1"));
}

#[test]
fn failed_frame_decodes_details_and_comparison() {
    let line = FrameBuilder::failed("test_eq", "Failed asserting that 2 matches expected 1.")
        .attr("details", "/app/tests/T.php:22\n/app/vendor/phpunit/phpunit/phpunit:104\n")
        .attr("type", "comparisonFailure")
        .attr("actual", "2")
        .attr("expected", "1")
        .flow("3")
        .build();

    let Some(ProtocolEvent::TestFailed(fault)) = parse_line(&line) else {
        panic!("expected testFailed");
    };
    assert_eq!(fault.message, "Failed asserting that 2 matches expected 1.");
    assert_eq!(
        fault.details,
        vec![
            FaultFrame { file: "/app/tests/T.php".into(), line: 22 },
            FaultFrame { file: "/app/vendor/phpunit/phpunit/phpunit".into(), line: 104 },
        ]
    );
    let comparison = fault.comparison.expect("comparison");
    assert_eq!(comparison.kind, "comparisonFailure");
    assert_eq!(comparison.actual, "2");
    assert_eq!(comparison.expected, "1");
}

#[test]
fn escapes_are_undone() {
    let line = "##teamcity[testIgnored name='x' message='it||s |'quoted|' |[a|]|nnext']";

    let Some(ProtocolEvent::TestIgnored(fault)) = parse_line(line) else {
        panic!("expected testIgnored");
    };
    assert_eq!(fault.message, "it|s 'quoted' [a]\nnext");
}

#[test]
fn escape_and_unescape_agree() {
    let raw = "a|b 'c' [d]\r\ne";
    assert_eq!(unescape(&escape(raw)), raw);
    assert_eq!(unescape("|0x00e9"), "é");
}

#[test]
fn marker_may_follow_other_output() {
    let line = "PHP Warning: something ##teamcity[testCount count='4' flowId='7']";
    assert_eq!(
        parse_line(line).map(|e| e.kind()),
        Some(EventKind::TestCount)
    );
}

#[test]
fn malformed_and_unknown_frames_produce_nothing() {
    assert_eq!(parse_line("##teamcity[testStarted name='unterminated"), None);
    assert_eq!(parse_line("##teamcity[testStdOut name='x' out='hi']"), None);
    assert_eq!(parse_line("##teamcity[]"), None);
    assert!(parse_service_message("no marker here").is_none());
    assert_eq!(parse_line("."), None);
    assert_eq!(parse_line(""), None);
}

#[test]
fn version_banners() {
    let Some(ProtocolEvent::TestVersion(v)) =
        parse_line("PHPUnit 10.5.9 by Sebastian Bergmann and contributors.")
    else {
        panic!("expected version");
    };
    assert_eq!(v.phpunit, "10.5.9");
    assert_eq!(v.paratest, None);

    let Some(ProtocolEvent::TestVersion(v)) = parse_line("ParaTest v7.3.1 upon PHPUnit 10.5.9 by Sebastian Bergmann and contributors.")
    else {
        panic!("expected version");
    };
    assert_eq!(v.paratest.as_deref(), Some("7.3.1"));
    assert_eq!(v.phpunit, "10.5.9");
}

#[test]
fn runtime_configuration_and_time_banners() {
    let Some(ProtocolEvent::TestRuntime(r)) = parse_line("Runtime:       PHP 8.3.1") else {
        panic!("expected runtime");
    };
    assert_eq!(r.runtime, "PHP 8.3.1");

    let Some(ProtocolEvent::TestConfiguration(c)) = parse_line("Configuration: /app/phpunit.xml")
    else {
        panic!("expected configuration");
    };
    assert_eq!(c.path, "/app/phpunit.xml");

    let Some(ProtocolEvent::TestDuration(d)) = parse_line("Time: 00:00.049, Memory: 6.00 MB") else {
        panic!("expected duration");
    };
    assert_eq!(d.time, "00:00.049");
    assert_eq!(d.memory, "6.00 MB");
}

#[test]
fn short_and_long_summaries() {
    let Some(ProtocolEvent::TestResultSummary(s)) = parse_line("OK (3 tests, 5 assertions)") else {
        panic!("expected summary");
    };
    assert_eq!((s.tests, s.assertions, s.failures), (Some(3), Some(5), None));

    let Some(ProtocolEvent::TestResultSummary(s)) =
        parse_line("Tests: 9, Assertions: 12, Errors: 1, Failures: 2, Skipped: 1, PHPUnit Deprecations: 3.")
    else {
        panic!("expected summary");
    };
    assert_eq!(s.tests, Some(9));
    assert_eq!(s.assertions, Some(12));
    assert_eq!(s.errors, Some(1));
    assert_eq!(s.failures, Some(2));
    assert_eq!(s.skipped, Some(1));
    assert_eq!(s.deprecations, Some(3));
    assert_eq!(s.warnings, None);
}
