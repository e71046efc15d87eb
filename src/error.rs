//! Error types for the Payroll Invoice Engine.
//!
//! Computation paths (normalization, rate resolution, aggregation, pay) never
//! fail: malformed data resolves to zeroed defaults. The errors below cover the
//! remaining cases: configuration loading, rejected operator edits, and payload
//! serialization.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the Payroll Invoice Engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// An hours adjustment for a date was rejected.
    #[error("Invalid hours adjustment for {date}: {message}")]
    InvalidAdjustment {
        /// The date the adjustment targeted.
        date: NaiveDate,
        /// Why the adjustment was rejected.
        message: String,
    },

    /// Operator-entered hours text could not be read as a number.
    #[error("Invalid hours input: '{input}'")]
    InvalidHoursInput {
        /// The raw text that was entered.
        input: String,
    },

    /// A rate override was rejected.
    #[error("Invalid rate '{field}': {message}")]
    InvalidRate {
        /// The rate field that was being set.
        field: String,
        /// Why the rate was rejected.
        message: String,
    },

    /// No shifts exist on the requested date.
    #[error("No shifts found on {date}")]
    DateNotFound {
        /// The date that had no shifts.
        date: NaiveDate,
    },

    /// A record could not be serialized for the invoice payload.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// A description of the serialization failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::SerializationError {
            message: err.to_string(),
        }
    }
}
