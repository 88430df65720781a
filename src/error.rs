//! Error Handling Infrastructure
//!
//! This module defines the single error type used throughout the tracker.
//! Every error maps to a stable error code that is logged alongside the message.
//!
//! # Error Categories
//! - `ConfigError`: Missing or malformed environment configuration
//! - `ConnectionFailed`: Database connection errors (fatal at startup)
//! - `QueryFailed`: Statement execution errors
//! - `ConstraintViolation`: Integrity constraint errors reported by the database
//! - `InvalidInput`: Operator input rejected before it reaches the database
//! - `PromptFailed`: Terminal prompt errors (closed stdin, not a TTY, ...)
//! - `OutputFailed`: A row could not be turned into a table

use thiserror::Error;
use tokio_postgres::error::SqlState;

/// Main error type for tracker operations
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Configuration error (missing variable, unparsable port, ...)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Database connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// The database rejected a statement because of a constraint
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Invalid operator input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Interactive prompt failed
    #[error("Prompt failed: {0}")]
    PromptFailed(String),

    /// Rendering rows for display failed
    #[error("Output failed: {0}")]
    OutputFailed(String),
}

impl TrackerError {
    /// Convert error to a stable error code string
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ConnectionFailed(_) => "CONNECTION_FAILED",
            Self::QueryFailed(_) => "QUERY_FAILED",
            Self::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::PromptFailed(_) => "PROMPT_FAILED",
            Self::OutputFailed(_) => "OUTPUT_FAILED",
        }
    }

    /// Get human-readable error message (never contains credentials)
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed(message.into())
    }

    /// Create a query failed error
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::QueryFailed(message.into())
    }

    /// Create a constraint violation error
    pub fn constraint_violation(message: impl Into<String>) -> Self {
        Self::ConstraintViolation(message.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a prompt failed error
    pub fn prompt_failed(message: impl Into<String>) -> Self {
        Self::PromptFailed(message.into())
    }

    /// Create an output failed error
    pub fn output_failed(message: impl Into<String>) -> Self {
        Self::OutputFailed(message.into())
    }

    /// Classify a driver error raised while running `operation`.
    ///
    /// SQLSTATE class 23 (integrity constraint violation) is reported as
    /// `ConstraintViolation`, everything else as `QueryFailed`.
    pub fn from_query(operation: &str, err: &tokio_postgres::Error) -> Self {
        let detail = match err.as_db_error() {
            Some(db) => db.message().to_string(),
            None => err.to_string(),
        };

        match err.code() {
            Some(code) if is_integrity_violation(code) => {
                Self::constraint_violation(format!("{operation}: {detail}"))
            }
            _ => Self::query_failed(format!("{operation}: {detail}")),
        }
    }
}

fn is_integrity_violation(code: &SqlState) -> bool {
    code.code().starts_with("23")
}

impl From<dialoguer::Error> for TrackerError {
    fn from(err: dialoguer::Error) -> Self {
        Self::prompt_failed(err.to_string())
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        Self::prompt_failed(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        Self::output_failed(err.to_string())
    }
}

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;
