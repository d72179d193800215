//! Error types for the local collection registry.

use thiserror::Error;

/// Result type for registry operations.
pub type CollectionResult<T> = Result<T, CollectionError>;

#[derive(Error, Debug)]
pub enum CollectionError {
    /// No registered load handler accepted the collection id
    #[error("No load handler accepted collection '{0}'")]
    NoHandler(String),

    /// A load handler recognised the collection but failed
    #[error("Load handler '{handler}' failed for '{id}': {source}")]
    Handler {
        handler: String,
        id: String,
        #[source]
        source: anyhow::Error,
    },

    /// Malformed `load_collection` argument bag
    #[error("Invalid load_collection arguments: {0}")]
    InvalidArgs(#[from] serde_json::Error),

    /// Subscriber installation failed
    #[error("Logging setup failed: {0}")]
    Logging(String),
}
