//! Error types for the coin-search crate.
//!
//! Only failures that abort a whole search surface here. Per-candidate
//! fetch problems are reported as [`crate::types::FetchOutcome`] values
//! and never become a [`SearchError`].

/// Errors that can occur during a search run.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Every configured backend failed to answer the query.
    #[error("all search engines failed: {0}")]
    AllEnginesFailed(String),

    /// The overall search deadline elapsed.
    #[error("search timed out: {0}")]
    Timeout(String),

    /// An HTTP request to a backend or page failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A backend or page response could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid configuration or header profile resource.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for coin-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
