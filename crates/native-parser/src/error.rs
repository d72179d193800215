//! Error types for native product parsing.

use thiserror::Error;

/// Result type for native parser operations.
pub type NativeResult<T> = Result<T, NativeError>;

/// Error types for native product parsing.
#[derive(Error, Debug)]
pub enum NativeError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Missing required variable, attribute or element
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Malformed XML document
    #[error("XML error: {0}")]
    Xml(String),

    /// Variable the reader cannot provide
    #[error("Unsupported variable: {0}")]
    UnsupportedVariable(String),
}

impl From<quick_xml::Error> for NativeError {
    fn from(err: quick_xml::Error) -> Self {
        NativeError::Xml(err.to_string())
    }
}
