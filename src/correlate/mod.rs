// src/correlate/mod.rs

//! Correlation of asynchronous protocol frames into result records.

pub mod correlator;
pub mod result;

pub use correlator::{CorrelationKey, ResultCorrelator};
pub use result::{ResultKind, ResultScope, TestResult};
