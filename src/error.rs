//! Error types for the mirror renderer

use thiserror::Error;

/// Result type alias for rendering operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving surfaces and drawing widgets
#[derive(Error, Debug)]
pub enum Error {
    /// Surface id did not resolve to a drawing surface
    #[error("Surface not found: {0}")]
    SurfaceNotFound(String),

    /// Progress fraction refused by the configured policy
    #[error("Invalid progress fraction: {0}")]
    InvalidFraction(f64),

    /// Bad argument to a drawing primitive
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failed to encode a surface
    #[error("Encoding failed: {0}")]
    EncodeError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Failed to parse an input payload
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<png::EncodingError> for Error {
    fn from(err: png::EncodingError) -> Self {
        Error::EncodeError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ParseError(err.to_string())
    }
}
