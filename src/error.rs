//! Error types for jsondb
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using DbError
pub type Result<T> = std::result::Result<T, DbError>;

/// Unified error type for jsondb operations
#[derive(Debug, Error)]
pub enum DbError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failures inside a single store operation.
///
/// The public `Store` operations log these and report plain failure;
/// the `try_*` variants hand them back to the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A non-final path segment resolved to something that is not an object
    #[error("path segment '{segment}' is not an object")]
    Conflict { segment: String },

    /// The path does not resolve to a stored value
    #[error("no value at path")]
    NotFound,

    /// Reading or writing the database file failed
    #[error("database file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The database file exists but does not hold a JSON object
    #[error("database file is corrupt: {0}")]
    Corrupt(String),
}
