//! Error types for mapwatch.

use thiserror::Error;

/// Common error type for mapwatch.
#[derive(Error, Debug)]
pub enum MapwatchError {
    /// Network or HTTP failure while fetching the listing, or the expected
    /// payload marker was absent from the response body.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The extracted payload was not valid structured data, or a consumed
    /// field was missing or mistyped.
    #[error("parse error: {0}")]
    Parse(String),

    /// Durable store read/write failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Outbound delivery failure.
    #[error("notify error: {0}")]
    Notify(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for mapwatch operations.
pub type Result<T> = std::result::Result<T, MapwatchError>;
