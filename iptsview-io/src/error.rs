//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Instrument name not in the table.
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    /// Experiment number outside the accepted range.
    #[error("invalid IPTS number: {0}")]
    InvalidIpts(String),

    /// Invalid file format.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    /// A datafile record lacks a projected field.
    #[error("datafile {index}: missing field '{field}'")]
    MissingField { index: usize, field: String },

    /// A datafile field could not be converted.
    #[error("datafile {index}: field '{field}' has invalid value {value}")]
    InvalidField {
        index: usize,
        field: String,
        value: String,
    },

    /// Plot series whose lengths differ from the selection.
    #[error("series do not match the {rows} selected runs")]
    SeriesMismatch { rows: usize },

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] iptsview_core::Error),
}
