//! Error types for the Nuclear AO3 tag services.

use thiserror::Error;

/// Result type alias using the crate-wide Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tag operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Tag store lookup failed (synonym resolution, canonical lookup)
    #[error("Tag store error: {0}")]
    TagStore(String),

    /// A collaborator call did not finish in time
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error. Raised at startup, never per request.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
