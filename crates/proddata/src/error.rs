//! Error types for proddata.
//!
//! This module defines all error types used throughout the proddata crate.
//! Callers can tell a missing record apart from an unavailable store or a
//! corrupted storage slot, and the controller decides which of those become
//! user-visible messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for proddata operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// The key-value store refused a read or write.
    #[error("storage unavailable for slot '{key}': {message}")]
    Storage {
        /// The storage slot being accessed.
        key: String,
        /// Description of what went wrong.
        message: String,
    },

    /// A storage slot holds a value that is not the expected JSON shape.
    #[error("malformed data in slot '{key}': {source}")]
    MalformedData {
        /// The storage slot that failed to parse.
        key: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    // === Record Errors ===
    /// No record with the given id exists in the collection.
    #[error("record not found: {id}")]
    RecordNotFound {
        /// The id that was looked up.
        id: String,
    },

    /// A date bound could not be parsed.
    #[error("invalid date: '{value}'")]
    InvalidDate {
        /// The offending input.
        value: String,
    },

    /// User input was rejected before reaching storage.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of what is wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Export Errors ===
    /// Writing an export artifact failed.
    #[error("export failed: {0}")]
    Export(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for proddata operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new storage error for the given slot.
    #[must_use]
    pub fn storage(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a record-not-found error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::RecordNotFound { id: id.into() }
    }

    /// Create an invalid date error.
    #[must_use]
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new export error.
    #[must_use]
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export(message.into())
    }

    /// Check if this error means the requested record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. })
    }

    /// Check if this error means the backing store could not be used.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. }
                | Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
        )
    }

    /// Check if this error means a storage slot held unreadable data.
    #[must_use]
    pub fn is_malformed_data(&self) -> bool {
        matches!(self, Self::MalformedData { .. })
    }
}
