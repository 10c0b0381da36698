//! Common error types for bookden

use thiserror::Error;

/// Common result type for bookden operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the bookden service
#[derive(Error, Debug)]
pub enum Error {
    /// Store operation error (wraps sqlx::Error, either store)
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation rejected in the current state (expired token, malformed vote)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A derived-value recalculation failed after its source mutation committed.
    /// The mutation stands; the aggregate lags until the next trigger or an
    /// explicit repair pass.
    #[error("Partial consistency: {0}")]
    PartialConsistency(String),

    /// Token signing or validation error
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
