//! Error types for iptsview-core.

use crate::RunNumber;
use thiserror::Error;

/// Result type alias for iptsview operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while parsing a run range string.
///
/// These are always recoverable: the caller reports them and keeps
/// whatever selection it held before.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeParseError {
    /// A comma-separated token was empty.
    #[error("empty run token at position {position}")]
    EmptyToken { position: usize },

    /// A token had more than one `:`.
    #[error("malformed run token '{token}': expected N or FIRST:LAST")]
    MalformedToken { token: String },

    /// A token part was not a non-negative integer.
    #[error("invalid run number '{value}' in token '{token}'")]
    InvalidRunNumber { token: String, value: String },

    /// A range whose first run is greater than its last.
    #[error("descending run range {first}:{last}")]
    DescendingRange { first: RunNumber, last: RunNumber },

    /// The expansion would produce more runs than the configured limit.
    #[error("run range expands to more than {limit} runs")]
    TooManyRuns { limit: usize },
}

/// Core error types for iptsview operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed run range string.
    #[error("invalid run range: {0}")]
    Parse(#[from] RangeParseError),

    /// Attempt to compact an empty set of runs.
    #[error("cannot compact an empty set of runs")]
    EmptyRunSet,

    /// Title not present in the loaded experiment.
    #[error("unknown run title: {0}")]
    UnknownTitle(String),

    /// Operation needs an experiment but none is loaded.
    #[error("no experiment loaded")]
    NoExperiment,

    /// A record carries the wrong number of goniometer values.
    #[error("record {index} has {found} goniometer values, expected {expected}")]
    GoniometerMismatch {
        index: usize,
        found: usize,
        expected: usize,
    },

    /// A data index outside the experiment's records.
    #[error("data index {index} out of range for {len} records")]
    IndexOutOfRange { index: usize, len: usize },
}
