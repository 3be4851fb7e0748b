// src/correlate/correlator.rs

//! Pairs start/fault/finish frames into closed [`TestResult`]s.
//!
//! Each `(name, flowId)` moves through `absent → open → closed`. Faults are
//! merged into the open record; the kind of the emitted result is read off
//! that accumulated state, never off the finishing frame's name.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::correlate::result::{ResultKind, ResultScope, TestResult};
use crate::protocol::{ProtocolEvent, TestFault, TestFinished, TestStarted};

/// Identity of one in-flight test or suite within a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationKey {
    pub name: String,
    pub flow_id: Option<String>,
}

impl CorrelationKey {
    pub fn new(name: impl Into<String>, flow_id: Option<String>) -> Self {
        Self {
            name: name.into(),
            flow_id,
        }
    }
}

#[derive(Debug, Clone)]
struct Fault {
    kind: ResultKind,
    payload: TestFault,
}

#[derive(Debug, Clone)]
struct OpenRecord {
    scope: ResultScope,
    started: TestStarted,
    fault: Option<Fault>,
}

/// Per-run correlation state. Create a fresh one for every run.
#[derive(Debug, Default)]
pub struct ResultCorrelator {
    open: HashMap<CorrelationKey, OpenRecord>,
    /// Faults that arrived before their start frame.
    parked: HashMap<CorrelationKey, Fault>,
}

impl ResultCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently open.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    pub fn is_idle(&self) -> bool {
        self.open.is_empty() && self.parked.is_empty()
    }

    /// Feed one event; returns the result it closes, if any.
    pub fn step(&mut self, event: &ProtocolEvent) -> Option<TestResult> {
        match event {
            ProtocolEvent::TestSuiteStarted(started) => {
                self.open_record(ResultScope::Suite, started);
                None
            }
            ProtocolEvent::TestStarted(started) => {
                self.open_record(ResultScope::Test, started);
                None
            }
            ProtocolEvent::TestFailed(fault) => {
                self.record_fault(ResultKind::Failed, fault);
                None
            }
            ProtocolEvent::TestIgnored(fault) => {
                self.record_fault(ResultKind::Ignored, fault);
                None
            }
            ProtocolEvent::TestFinished(finished) | ProtocolEvent::TestSuiteFinished(finished) => {
                self.close_record(finished)
            }
            _ => None,
        }
    }

    /// Drop all open and parked state, returning how many records were open.
    pub fn discard(&mut self) -> usize {
        let open = self.open.len();
        self.open.clear();
        self.parked.clear();
        open
    }

    fn open_record(&mut self, scope: ResultScope, started: &TestStarted) {
        let key = CorrelationKey::new(started.name.clone(), started.flow_id.clone());
        let fault = self.parked.remove(&key);

        let record = OpenRecord {
            scope,
            started: started.clone(),
            fault,
        };
        if self.open.insert(key, record).is_some() {
            warn!(
                name = %started.name,
                flow_id = ?started.flow_id,
                "start frame for an already open record; replacing it"
            );
        }
    }

    fn record_fault(&mut self, kind: ResultKind, payload: &TestFault) {
        let key = CorrelationKey::new(payload.name.clone(), payload.flow_id.clone());
        let fault = Fault {
            kind,
            payload: payload.clone(),
        };

        match self.open.get_mut(&key) {
            Some(record) => merge_fault(&mut record.fault, fault),
            None => {
                debug!(
                    name = %payload.name,
                    flow_id = ?payload.flow_id,
                    "fault before start frame; parking it"
                );
                let parked = self.parked.entry(key).or_insert_with(|| fault.clone());
                if parked.kind == ResultKind::Ignored && fault.kind == ResultKind::Failed {
                    *parked = fault;
                }
            }
        }
    }

    fn close_record(&mut self, finished: &TestFinished) -> Option<TestResult> {
        let key = CorrelationKey::new(finished.name.clone(), finished.flow_id.clone());
        let Some(record) = self.open.remove(&key) else {
            debug!(
                name = %finished.name,
                flow_id = ?finished.flow_id,
                "finish frame without open record; dropping"
            );
            return None;
        };

        let location = record.started.location;
        let (kind, fault) = match record.fault {
            Some(Fault { kind, payload }) => (kind, Some(payload)),
            None => (ResultKind::Passed, None),
        };
        let duration_ms = finished
            .duration_ms
            .or_else(|| fault.as_ref().and_then(|f| f.duration_ms));

        Some(TestResult {
            scope: record.scope,
            kind,
            name: record.started.name,
            flow_id: record.started.flow_id,
            id: location.as_ref().map(|l| l.id.clone()),
            test_id: location.as_ref().map(|l| l.test_id.clone()),
            file: location.as_ref().map(|l| l.file.clone()),
            location_hint: location.map(|l| l.hint),
            duration_ms,
            message: fault.as_ref().map(|f| f.message.clone()),
            details: fault.as_ref().map(|f| f.details.clone()).unwrap_or_default(),
            comparison: fault.and_then(|f| f.comparison),
        })
    }
}

/// A failure outranks an ignore; otherwise the first fault wins.
fn merge_fault(slot: &mut Option<Fault>, fault: Fault) {
    match slot {
        None => *slot = Some(fault),
        Some(existing) if existing.kind == ResultKind::Ignored && fault.kind == ResultKind::Failed => {
            *existing = fault;
        }
        Some(_) => {}
    }
}
