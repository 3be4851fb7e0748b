// tests/result_correlation.rs

mod common;
use crate::common::builders::FrameBuilder;
use crate::common::init_tracing;

use proptest::prelude::*;

use phpunit_relay::correlate::{ResultCorrelator, ResultKind, ResultScope, TestResult};
use phpunit_relay::protocol::parse_line;

/// Feed raw lines through parser and correlator, collecting results.
fn correlate(correlator: &mut ResultCorrelator, lines: &[String]) -> Vec<TestResult> {
    lines
        .iter()
        .filter_map(|line| parse_line(line))
        .filter_map(|event| correlator.step(&event))
        .collect()
}

#[test]
fn started_then_finished_is_passed() {
    init_tracing();
    let mut correlator = ResultCorrelator::new();
    let lines = vec![
        r"##teamcity[testStarted name='test_passed' locationHint='php_qn:///app/tests/T.php::\NS\T::test_passed' flowId='1']".to_string(),
        "##teamcity[testFinished name='test_passed' duration='12' flowId='1']".to_string(),
    ];

    let results = correlate(&mut correlator, &lines);

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.kind, ResultKind::Passed);
    assert_eq!(result.scope, ResultScope::Test);
    assert_eq!(result.id.as_deref(), Some(r"NS\T::test_passed"));
    assert_eq!(result.file.as_deref(), Some("/app/tests/T.php"));
    assert_eq!(result.duration_ms, Some(12));
    assert!(correlator.is_idle());
}

#[test]
fn failed_then_finished_is_failed() {
    init_tracing();
    let mut correlator = ResultCorrelator::new();
    let lines = vec![
        FrameBuilder::started("x").flow("1").build(),
        FrameBuilder::failed("x", "boom")
            .attr("details", "/app/tests/T.php:9")
            .flow("1")
            .build(),
        FrameBuilder::finished("x").duration(5).flow("1").build(),
    ];

    let results = correlate(&mut correlator, &lines);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].kind, ResultKind::Failed);
    assert_eq!(results[0].message.as_deref(), Some("boom"));
    assert_eq!(results[0].details.len(), 1);
    assert_eq!(results[0].duration_ms, Some(5));
}

#[test]
fn ignored_test_is_ignored() {
    let mut correlator = ResultCorrelator::new();
    let lines = vec![
        FrameBuilder::started("skipped").build(),
        FrameBuilder::ignored("skipped", "not today").build(),
        FrameBuilder::finished("skipped").build(),
    ];

    let results = correlate(&mut correlator, &lines);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].kind, ResultKind::Ignored);
    assert!(!results[0].is_failure());
}

#[test]
fn failure_outranks_ignore() {
    let mut correlator = ResultCorrelator::new();
    let lines = vec![
        FrameBuilder::started("t").build(),
        FrameBuilder::ignored("t", "risky").build(),
        FrameBuilder::failed("t", "real failure").build(),
        FrameBuilder::finished("t").build(),
    ];

    let results = correlate(&mut correlator, &lines);

    assert_eq!(results[0].kind, ResultKind::Failed);
    assert_eq!(results[0].message.as_deref(), Some("real failure"));
}

#[test]
fn fault_before_start_is_merged() {
    init_tracing();
    let mut correlator = ResultCorrelator::new();
    let lines = vec![
        FrameBuilder::failed("early", "boom").flow("2").build(),
        FrameBuilder::started("early").flow("2").build(),
        FrameBuilder::finished("early").flow("2").build(),
    ];

    let results = correlate(&mut correlator, &lines);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].kind, ResultKind::Failed);
}

#[test]
fn finish_without_start_is_dropped() {
    init_tracing();
    let mut correlator = ResultCorrelator::new();
    let lines = vec![FrameBuilder::finished("ghost").flow("1").build()];

    assert!(correlate(&mut correlator, &lines).is_empty());
    assert!(correlator.is_idle());
}

#[test]
fn flow_ids_keep_same_named_tests_apart() {
    init_tracing();
    let mut correlator = ResultCorrelator::new();
    let lines = vec![
        FrameBuilder::started("test_a").flow("1").build(),
        FrameBuilder::started("test_a").flow("2").build(),
        FrameBuilder::failed("test_a", "worker 2 failed").flow("2").build(),
        FrameBuilder::finished("test_a").flow("1").build(),
        FrameBuilder::finished("test_a").flow("2").build(),
    ];

    let results = correlate(&mut correlator, &lines);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].flow_id.as_deref(), Some("1"));
    assert_eq!(results[0].kind, ResultKind::Passed);
    assert_eq!(results[1].flow_id.as_deref(), Some("2"));
    assert_eq!(results[1].kind, ResultKind::Failed);
}

#[test]
fn duplicate_start_overwrites_open_record() {
    init_tracing();
    let mut correlator = ResultCorrelator::new();
    let lines = vec![
        FrameBuilder::started("dup").location("php_qn:///a.php::\\A::dup").build(),
        FrameBuilder::started("dup").location("php_qn:///b.php::\\B::dup").build(),
        FrameBuilder::finished("dup").build(),
    ];

    let results = correlate(&mut correlator, &lines);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].file.as_deref(), Some("/b.php"));
}

#[test]
fn suites_close_around_their_tests() {
    let mut correlator = ResultCorrelator::new();
    let lines = vec![
        FrameBuilder::suite_started("Tests\\T").build(),
        FrameBuilder::started("test_a").build(),
        FrameBuilder::finished("test_a").build(),
        FrameBuilder::suite_finished("Tests\\T").build(),
    ];

    let results = correlate(&mut correlator, &lines);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].scope, ResultScope::Test);
    assert_eq!(results[1].scope, ResultScope::Suite);
    assert_eq!(results[1].kind, ResultKind::Passed);
}

#[test]
fn discard_drops_open_and_parked_records() {
    let mut correlator = ResultCorrelator::new();
    correlate(
        &mut correlator,
        &[
            FrameBuilder::started("open").build(),
            FrameBuilder::failed("orphan", "x").build(),
        ],
    );

    assert_eq!(correlator.open_count(), 1);
    assert_eq!(correlator.discard(), 1);
    assert!(correlator.is_idle());
}

#[derive(Debug, Clone, Copy)]
enum Fault {
    None,
    Failed,
    Ignored,
}

proptest! {
    /// Any order in which the start precedes the finish yields exactly one
    /// result whose kind follows the recorded fault.
    #[test]
    fn every_interleaving_yields_one_result(
        fault in prop_oneof![Just(Fault::None), Just(Fault::Failed), Just(Fault::Ignored)],
        fault_first in any::<bool>(),
        noise in proptest::collection::vec("[a-z]{1,6}", 0..4),
    ) {
        let mut lines = Vec::new();
        let fault_line = match fault {
            Fault::None => None,
            Fault::Failed => Some(FrameBuilder::failed("t", "f").flow("9").build()),
            Fault::Ignored => Some(FrameBuilder::ignored("t", "i").flow("9").build()),
        };

        if fault_first {
            lines.extend(fault_line.clone());
        }
        lines.push(FrameBuilder::started("t").flow("9").build());
        for other in &noise {
            lines.push(FrameBuilder::started(other).flow("1").build());
        }
        if !fault_first {
            lines.extend(fault_line);
        }
        lines.push(FrameBuilder::finished("t").flow("9").build());

        let mut correlator = ResultCorrelator::new();
        let results: Vec<_> = correlate(&mut correlator, &lines)
            .into_iter()
            .filter(|r| r.name == "t")
            .collect();

        prop_assert_eq!(results.len(), 1);
        let expected = match fault {
            Fault::None => ResultKind::Passed,
            Fault::Failed => ResultKind::Failed,
            Fault::Ignored => ResultKind::Ignored,
        };
        prop_assert_eq!(results[0].kind, expected);
    }
}
