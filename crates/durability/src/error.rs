//! Stream error types

use keepsake_core::BundleError;
use std::io;
use thiserror::Error;

/// Errors that can occur while reading or writing a bundle stream
#[derive(Debug, Error)]
pub enum StreamError {
    /// Underlying stream or file failure
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The text is not well-formed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Gzip encoding or decoding failed
    #[error("Compression error: {0}")]
    Compression(String),

    /// The document parsed but its top level cannot become a bundle
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The document could not be wrapped as a bundle
    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),

    /// Stream configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),
}

impl StreamError {
    /// Create a compression error
    pub fn compression(msg: impl Into<String>) -> Self {
        Self::Compression(msg.into())
    }

    /// Create an invalid document error
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type for stream operations
pub type StreamResult<T> = Result<T, StreamError>;
