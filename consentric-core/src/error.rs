//! Error types for consentric-core

use thiserror::Error;

/// Main error type for the consentric-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Storage backend error
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Analytics service error
    #[error("service error: {0}")]
    Service(String),
}

/// Result type alias for consentric-core
pub type Result<T> = std::result::Result<T, Error>;
