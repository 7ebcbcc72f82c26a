//! Commands for the prethread CLI
//!
//! Each command builds a pool from the effective configuration, runs one
//! workload on it and checks the outcome.

pub mod config;
pub mod counter;
pub mod handoff;

use thiserror::Error;

/// Ways a workload can come out wrong
#[derive(Debug, Error)]
pub enum WorkloadError {
    /// Fewer threads were launched than the pool holds
    #[error("only {started} of {expected} threads started")]
    PartialStart {
        /// Threads launched
        started: usize,
        /// Pool size
        expected: usize,
    },

    /// The workload finished with an unexpected result
    #[error("{what} is {actual}, expected {expected}")]
    Mismatch {
        /// What was measured
        what: &'static str,
        /// Measured value
        actual: usize,
        /// Expected value
        expected: usize,
    },
}
