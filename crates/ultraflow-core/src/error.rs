//! Core error types for ultraflow-core.
//!
//! Each layer gets its own `thiserror` enum; [`CoreError`] wraps them for
//! callers that just want one type to propagate with `?`.

use std::path::PathBuf;
use thiserror::Error;

use crate::sync::SyncError;

/// Core error type for ultraflow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Local persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Remote mirror errors
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Local storage errors.
///
/// Reads that hit these degrade to empty/default values at the store layer;
/// writes always surface them.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Storage backend could not serve the request
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A stored document is not in the expected shape
    #[error("Document '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A document could not be encoded before writing
    #[error("Failed to encode document '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to resolve the data directory
    #[error("Failed to prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Energy rating outside 1..=5
    #[error("Energy level {value} is outside 1..=5")]
    EnergyOutOfRange { value: i64 },

    /// Energy rating that is not an integer
    #[error("Energy level '{input}' is not a whole number")]
    MalformedEnergy { input: String },

    /// Duration outside the allowed domain
    #[error("{field} must be between {min} and {max} minutes, got {value}")]
    DurationOutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Duration not aligned to the slider step
    #[error("{field} must be a multiple of {step} minutes, got {value}")]
    DurationStep {
        field: &'static str,
        value: u32,
        step: u32,
    },

    /// Unknown settings field
    #[error("Unknown settings field: {0}")]
    UnknownField(String),

    /// Value that cannot be parsed for the field
    #[error("Invalid value for '{field}': {input}")]
    MalformedValue { field: String, input: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked
                    || code.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StorageError::Locked
                } else {
                    StorageError::Unavailable(err.to_string())
                }
            }
            _ => StorageError::Unavailable(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
