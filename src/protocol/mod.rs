// src/protocol/mod.rs

//! Decoding of the test runner's console output.
//!
//! - [`teamcity`] tokenizes `##teamcity[...]` service messages.
//! - [`banner`] recognises the plain-text version/runtime/summary lines.
//! - [`parser`] turns either kind of line into a [`ProtocolEvent`].
//! - [`events`] defines the event types.

pub mod banner;
pub mod events;
pub mod parser;
pub mod teamcity;

pub use events::{
    Comparison, EventKind, FaultFrame, Location, ProtocolEvent, ResultSummary, TestCount,
    TestFault, TestFinished, TestStarted,
};
pub use parser::parse_line;
pub use teamcity::MARKER;
