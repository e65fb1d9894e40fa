//! Error types for receipt rendering

use thiserror::Error;

/// Result type alias for receipt operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing, rendering or storing a receipt
#[derive(Error, Debug)]
pub enum Error {
    /// The inbound request is malformed or misses a mandatory field
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The TrueType resource could not be read or parsed
    #[error("Font resource unavailable: {0}")]
    FontError(String),

    /// The vector document could not be produced
    #[error("Document generation failed: {0}")]
    GenerationError(String),

    /// A PDF could not be opened or interpreted during rasterization
    #[error("Conversion failed: {0}")]
    ConversionError(String),

    /// Requested page does not exist in the source document
    #[error("Page index {0} out of range")]
    PageOutOfRange(usize),

    /// Image encoding failed
    #[error("Image encoding failed: {0}")]
    EncodeError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Writing or reading a stored artifact failed
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "raster")]
impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::ConversionError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidRequest(err.to_string())
    }
}
