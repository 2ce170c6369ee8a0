//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`]. Failures are
//! caught at the operation boundary, logged, and surfaced to the user as a
//! single message; none of them are fatal to the process.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Unknown entity: {id}")]
    UnknownEntity { id: String },

    #[error("Unknown field: {field}")]
    UnknownField { field: String },

    #[error("Invalid period key: {period}")]
    InvalidPeriod { period: String },

    #[error("Import error: {message}")]
    Import { message: String },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Session expired at {expired_at}")]
    SessionExpired {
        expired_at: chrono::DateTime<chrono::Utc>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
