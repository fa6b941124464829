//! Error types for LADDER operations

use crate::direction::DirectionParseError;
use crate::identity::RecordId;
use thiserror::Error;

/// Reorder and request-boundary errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReorderError {
    #[error("Invalid direction: {given} (expected \"up\" or \"down\")")]
    InvalidDirection { given: String },

    #[error("Record not found: {id}")]
    RecordNotFound { id: RecordId },

    #[error("Sort change not permitted for record {id}")]
    PermissionDenied { id: RecordId },

    #[error("Missing required parameter: {name}")]
    MissingParameter { name: String },

    #[error("Malformed parameter {name}: {value}")]
    MalformedParameter { name: String, value: String },
}

impl From<DirectionParseError> for ReorderError {
    fn from(err: DirectionParseError) -> Self {
        ReorderError::InvalidDirection { given: err.0 }
    }
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Record not found in store: {id}")]
    NotFound { id: RecordId },

    #[error("Duplicate record id on insert: {id}")]
    DuplicateId { id: RecordId },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all LADDER errors.
#[derive(Debug, Clone, Error)]
pub enum LadderError {
    #[error("Reorder error: {0}")]
    Reorder(#[from] ReorderError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for LADDER operations.
pub type LadderResult<T> = Result<T, LadderError>;
