//! # Error Types
//!
//! Structured error types for steelcalc_core. Every variant carries enough
//! context to tell the caller which field, record, or operation failed.
//!
//! ## Example
//!
//! ```rust
//! use steelcalc_core::errors::{CalcError, CalcResult};
//!
//! fn check_flow(flow_m3h: f64) -> CalcResult<()> {
//!     if flow_m3h <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "oxygen_flow_rate_m3h",
//!             flow_m3h.to_string(),
//!             "Oxygen flow rate must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for steelcalc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation and storage operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An apparatus input failed validation; no computation was performed
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required parameter is absent from a stored parameter map
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// No record with this id (or not owned by the caller)
    #[error("Calculation not found: {id}")]
    NotFound { id: i64 },

    /// The embedded store rejected or failed an operation
    #[error("Persistence error during {operation}: {reason}")]
    Persistence { operation: String, reason: String },

    /// Stored parameter text for a specific record could not be decoded
    #[error("Cannot decode record {record_id}: {reason}")]
    Decode { record_id: i64, reason: String },

    /// Refused to encode a NaN or infinite parameter value
    #[error("Parameter '{name}' is not finite: {value}")]
    NonFiniteParameter { name: String, value: String },

    /// Calculation type outside OXYGEN_LANCE / LAVAL_NOZZLE
    #[error("Unknown calculation type: {value}")]
    UnknownCalculationType { value: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a Persistence error
    pub fn persistence(operation: impl Into<String>, reason: impl ToString) -> Self {
        CalcError::Persistence {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a Decode error for a stored record
    pub fn decode(record_id: i64, reason: impl Into<String>) -> Self {
        CalcError::Decode {
            record_id,
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl ToString) -> Self {
        CalcError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::NotFound { .. } => "NOT_FOUND",
            CalcError::Persistence { .. } => "PERSISTENCE_ERROR",
            CalcError::Decode { .. } => "DECODE_ERROR",
            CalcError::NonFiniteParameter { .. } => "NON_FINITE_PARAMETER",
            CalcError::UnknownCalculationType { .. } => "UNKNOWN_CALCULATION_TYPE",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}
