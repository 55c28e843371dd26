//! Core error types for rainodoro-core.
//!
//! This module defines the error hierarchy using thiserror. Nothing in the
//! timer itself is fatal: persistence failures are swallowed by the state
//! repository and a blocked start is reported as an event, so these types
//! mostly surface from the storage adapters, configuration and list edits.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for rainodoro-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

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

/// Key-value store errors.
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

    /// The backing store cannot be reached at all
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors for list edits.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Titles and break texts must contain something besides whitespace
    #[error("Title must not be empty")]
    EmptyTitle,

    /// No task with the given id
    #[error("Task not found: {0}")]
    UnknownTask(String),

    /// No break item with the given id
    #[error("Break item not found: {0}")]
    UnknownBreakItem(String),

    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },
}

/// A transition refused by a guard. Not an error condition for the
/// caller: the message is the guidance shown to the user.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardViolation {
    #[error("Select a task before starting a pomodoro")]
    NoTaskSelected,
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_message_is_user_guidance() {
        assert_eq!(
            GuardViolation::NoTaskSelected.to_string(),
            "Select a task before starting a pomodoro"
        );
    }

    #[test]
    fn validation_error_converts_into_core_error() {
        let err: CoreError = ValidationError::UnknownTask("abc".into()).into();
        assert_eq!(err.to_string(), "Validation error: Task not found: abc");
    }

    #[test]
    fn sqlite_failures_map_to_query_failed() {
        let err: StorageError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, StorageError::QueryFailed(_)));
    }
}
