//! Error types for launchpad.
//!
//! This module defines all error types used throughout the launchpad crate,
//! providing detailed context for debugging and the messages surfaced to
//! HTTP clients.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for launchpad operations.
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

    /// A stored row could not be decoded into a record.
    #[error("corrupt record for flight {flight_number}: {message}")]
    CorruptRecord {
        /// Flight number of the offending row.
        flight_number: i64,
        /// Description of what went wrong.
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

    // === Request Validation Errors ===
    /// One of mission, rocket, target or launchDate is absent.
    #[error("Missing required launch property")]
    MissingLaunchProperty,

    /// The launch date does not parse to a point in time.
    #[error("Invalid launch date")]
    InvalidLaunchDate,

    /// A flight number path segment is not an integer.
    #[error("Invalid flight number")]
    InvalidFlightNumber,

    /// Pagination query parameters are malformed.
    #[error("Invalid pagination parameters")]
    InvalidPagination,

    /// The request body is not a JSON object of the expected shape.
    #[error("Invalid request body")]
    InvalidRequestBody,

    // === Launch Errors ===
    /// The scheduling target is not in the planet reference set.
    #[error("No matching planet found")]
    TargetNotFound {
        /// The target that was requested.
        target: String,
    },

    /// No launch exists with the given flight number.
    #[error("Launch not found")]
    LaunchNotFound {
        /// The flight number that was requested.
        flight_number: i64,
    },

    /// Persisting a newly scheduled launch failed.
    #[error("Failed to schedule launch")]
    ScheduleFailed,

    /// An abort request matched a launch but modified nothing.
    #[error("Launch not aborted")]
    AbortFailed {
        /// The flight number that was requested.
        flight_number: i64,
    },

    // === Ingestion Errors ===
    /// The launch data provider answered with a non-success status.
    #[error("launch data download failed with status {status}")]
    IngestionFailed {
        /// HTTP status code returned by the provider.
        status: u16,
    },

    /// The launch data provider could not be reached or decoded.
    #[error("launch data provider error: {0}")]
    Provider(#[from] reqwest::Error),

    /// A provider document could not be mapped into a launch.
    #[error("invalid provider document for flight {flight_number}: {message}")]
    ProviderDocument {
        /// Flight number of the document.
        flight_number: i64,
        /// Description of what went wrong.
        message: String,
    },

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

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for launchpad operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a target-not-found error.
    #[must_use]
    pub fn target_not_found(target: impl Into<String>) -> Self {
        Self::TargetNotFound {
            target: target.into(),
        }
    }

    /// Create a provider document error.
    #[must_use]
    pub fn provider_document(flight_number: i64, message: impl Into<String>) -> Self {
        Self::ProviderDocument {
            flight_number,
            message: message.into(),
        }
    }

    /// Check if this error was caused by bad caller input.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::MissingLaunchProperty
                | Self::InvalidLaunchDate
                | Self::InvalidFlightNumber
                | Self::InvalidPagination
                | Self::InvalidRequestBody
        )
    }

    /// Check if this error means a referenced record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TargetNotFound { .. } | Self::LaunchNotFound { .. }
        )
    }

    /// Check if this error came from the persistence layer.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::CorruptRecord { .. }
        )
    }
}
