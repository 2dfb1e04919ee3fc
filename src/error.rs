//! Error types for redundancy analysis
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for index and analysis operations
#[derive(Error, Debug)]
pub enum IndexError {
    /// The persisted embedding index does not exist
    #[error("Embedding index not found at '{path}'")]
    IndexNotFound { path: PathBuf },

    /// The persisted index exists but cannot be understood
    #[error("Embedding index '{path}' is corrupted: {reason}")]
    IndexCorrupt { path: PathBuf, reason: String },

    /// File system errors
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize index for '{path}': {source}")]
    Serialization {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Threshold outside the cosine range or severities out of order
    #[error("Invalid threshold {value}: {reason}")]
    InvalidThreshold { value: f32, reason: &'static str },

    /// Configuration errors
    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    /// Embedding provider could not be set up at all
    #[error("Embedding provider unavailable: {reason}")]
    EmbedderUnavailable { reason: String },

    /// General errors for cases where we need to preserve existing behavior
    #[error("{0}")]
    General(String),
}

impl IndexError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::IndexNotFound { .. } => "INDEX_NOT_FOUND",
            Self::IndexCorrupt { .. } => "INDEX_CORRUPT",
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::FileWrite { .. } => "FILE_WRITE_ERROR",
            Self::Serialization { .. } => "SERIALIZATION_ERROR",
            Self::InvalidThreshold { .. } => "INVALID_THRESHOLD",
            Self::ConfigError { .. } => "CONFIG_ERROR",
            Self::EmbedderUnavailable { .. } => "EMBEDDER_UNAVAILABLE",
            Self::General(_) => "GENERAL_ERROR",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::IndexNotFound { .. } => vec![
                "Run 'redundex index <path>' to build the embedding index first",
                "Use --index to point at an existing index file",
            ],
            Self::IndexCorrupt { .. } => vec![
                "Run 'redundex index <path>' to rebuild the index from scratch",
                "Each record needs file, name/function and embedding fields",
            ],
            Self::FileRead { .. } => vec![
                "Check that the file exists and you have read permissions",
                "Ensure the file is not locked by another process",
            ],
            Self::FileWrite { .. } => vec![
                "Check disk space and write permissions for the index directory",
            ],
            Self::InvalidThreshold { .. } => vec![
                "Thresholds are cosine similarities between -1.0 and 1.0",
                "The critical threshold must not be lower than the potential threshold",
            ],
            Self::EmbedderUnavailable { .. } => vec![
                "The model is downloaded on first use, check your internet connection",
                "Check the [embedding] model name in settings.toml",
            ],
            _ => vec![],
        }
    }
}

/// Result type alias for index operations
pub type IndexResult<T> = Result<T, IndexError>;
