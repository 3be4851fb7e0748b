// src/correlate/result.rs

use serde::Serialize;

use crate::protocol::{Comparison, FaultFrame};

/// Terminal state of one test or suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Passed,
    Failed,
    Ignored,
}

/// Whether a result closes a suite or a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultScope {
    Suite,
    Test,
}

/// A closed result record. Built once from the accumulated events of one
/// `(name, flowId)` and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub scope: ResultScope,
    pub kind: ResultKind,
    pub name: String,
    pub flow_id: Option<String>,
    pub id: Option<String>,
    pub test_id: Option<String>,
    pub file: Option<String>,
    pub location_hint: Option<String>,
    pub duration_ms: Option<u64>,
    pub message: Option<String>,
    pub details: Vec<FaultFrame>,
    pub comparison: Option<Comparison>,
}

impl TestResult {
    pub fn is_failure(&self) -> bool {
        self.kind == ResultKind::Failed
    }
}
