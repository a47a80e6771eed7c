//! Error types for Phytotron Backbone.

use crate::stream::StreamName;
use thiserror::Error;

/// Result type alias for backbone operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the curation pipeline.
///
/// Cycle-fatal conditions only. Row-level validation rejections and join
/// mismatches are data, not errors, and never appear here.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration: {0}")]
    ConfigValidation(String),

    // Stream read errors (20-29)
    #[error("stream read failed for '{stream}': {message}")]
    StreamRead { stream: StreamName, message: String },

    // Snapshot errors (40-49)
    #[error("snapshot write failed: {0}")]
    Snapshot(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the stable error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::ConfigValidation(_) => 11,
            Error::StreamRead { .. } => 20,
            Error::Snapshot(_) => 40,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// The stream this error concerns, when there is one.
    pub fn stream(&self) -> Option<StreamName> {
        match self {
            Error::StreamRead { stream, .. } => Some(*stream),
            _ => None,
        }
    }
}
