//! Core error types for the Watson worker.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer,
//! and queue/HTTP failures are folded in by their respective crates.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the worker.
///
/// Every job outcome is either `Ok(())` or one of these. None of them are
/// retried; the worker logs the error and moves on to the next job.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Job failed: {0}")]
    Job(#[from] JobError),

    #[error("Provider request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Queue operation failed: {0}")]
    Queue(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Missing configuration key: {0}")]
    MissingConfigKey(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Another writer changed the row between read and write.
    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Failures tied to a single job's type or payload, or to a business rule
/// the job handler refuses to break.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Unknown job type: {0}")]
    UnknownType(String),

    #[error("No handler registered for job type: {0}")]
    Unhandled(String),

    #[error("Malformed payload for '{job_type}' job: {message}")]
    MalformedPayload { job_type: String, message: String },

    #[error("Access token already processed (token record {0})")]
    TokenAlreadyProcessed(String),

    #[error("Job user {requested} does not own this resource (owner is {owner})")]
    UserMismatch { requested: String, owner: String },

    #[error("Job handler panicked: {0}")]
    Panicked(String),
}

/// Errors raised while talking to an external aggregator.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} API error {status}: {body}")]
    Http {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("Failed to decode {provider} response: {message}")]
    Decode { provider: String, message: String },

    #[error("Failed to load client identity: {0}")]
    Identity(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Invalid month-year code: {0}")]
    InvalidMonthYear(i64),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
