/// Error and diagnostic types shared across the crate.
///
/// Configuration problems are fatal and reported as `ConfigError`;
/// start-up state repairs are reported as `StabilityCorrection` values
/// alongside the built state, never as errors.
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("lag table mixes positive and negative lag values (row {row}: {value})")]
    MixedSignLag { row: usize, value: f64 },

    #[error("{table} table is empty")]
    EmptyTable { table: &'static str },

    #[error("{table} table contains a non-finite value at row {row}")]
    NonFiniteValue { table: &'static str, row: usize },

    #[error("{table} table key column is not strictly increasing at row {row} ({value})")]
    NonMonotonicKey {
        table: &'static str,
        row: usize,
        value: f64,
    },

    #[error("K value at row {row} is negative ({value})")]
    NegativeK { row: usize, value: f64 },

    #[error("negative lag requires at least two lag breakpoints when K is variable")]
    NegativeLagBreakpoints,

    #[error("carryover array size {got} does not match expected {expected}")]
    CarryoverSizeMismatch { expected: usize, got: usize },

    #[error("no conversion between {from} and {to}")]
    IncompatibleUnits {
        from: &'static str,
        to: &'static str,
    },

    #[error("inflow series interval {series} does not match routing interval {routing}")]
    IntervalMismatch {
        series: crate::forcing::TimeInterval,
        routing: crate::forcing::TimeInterval,
    },

    #[error("inflow series is empty")]
    EmptySeries,

    #[error("inflow series contains a non-finite value at index {index}")]
    NonFiniteInflow { index: usize },
}

/// Exact-match lookup failure: the requested key has no row in the table.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("no row with key {key} (requested column {column})")]
pub struct KeyNotFound {
    pub key: f64,
    pub column: usize,
}

/// A start-up carryover value that was adjusted for numerical stability.
///
/// Returned by the builder rather than silently applied, so callers can
/// surface or suppress the diagnostic deliberately.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityCorrection {
    pub field: &'static str,
    pub original: f64,
    pub corrected: f64,
    pub reason: &'static str,
}

impl fmt::Display for StabilityCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} corrected from {} to {}: {}",
            self.field, self.original, self.corrected, self.reason
        )
    }
}
