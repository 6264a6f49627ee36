//! Error types for coinlens.

use coin_search::SearchError;

/// Top-level error type for coin identification.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Caller supplied an unusable label, query or confidence.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Web search error.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
