//! Core error types for screentime-core.
//!
//! Most of the engine never fails: malformed persisted data falls back to
//! defaults and invalid commands are ignored. The errors here cover the host
//! boundary (opening storage, editing settings).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for screentime-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

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

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Payload could not be encoded for writing
    #[error("Failed to encode '{key}': {message}")]
    EncodeFailed { key: String, message: String },
}

/// Settings-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Key is not a known settings field
    #[error("Unknown settings key: {0}")]
    UnknownKey(String),

    /// Value could not be parsed for the field's type
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Parent PIN did not match
    #[error("Parent PIN rejected")]
    PinRejected,
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
