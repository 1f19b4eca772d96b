//! Error types for Anneal
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Anneal
#[derive(Debug, Error)]
pub enum AnnealError {
    /// Text generation service failure (fatal to the current run)
    #[error("Generation error: {0}")]
    Generation(#[from] crate::llm::GenerationError),

    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),

    /// Audit log store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Anneal operations
pub type Result<T> = std::result::Result<T, AnnealError>;
