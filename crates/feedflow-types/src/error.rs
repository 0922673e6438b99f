//! Error types for frame and command parsing in feedflow-types.

use thiserror::Error;

/// Errors that can occur when decoding FeedFlow protocol frames or
/// validating outbound commands.
///
/// This error type is transport-agnostic and does not include I/O or
/// connection errors (those belong in feedflow-link).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ParseError {
    /// Telemetry frame did not contain the expected number of fields.
    #[error("expected {expected} comma-separated fields, got {actual}")]
    FieldCount {
        /// Number of fields a telemetry frame must carry.
        expected: usize,
        /// Number of fields actually present.
        actual: usize,
    },

    /// A telemetry field failed numeric parsing.
    #[error("invalid {field} field: {value:?}")]
    InvalidField {
        /// Name of the field that failed to parse.
        field: &'static str,
        /// The raw text of the failing field.
        value: String,
    },

    /// The frame was empty after trimming.
    #[error("empty frame")]
    EmptyFrame,

    /// A command carried an amount outside the accepted range.
    #[error("invalid feed amount: {0} (must be finite and > 0)")]
    InvalidAmount(f64),
}
