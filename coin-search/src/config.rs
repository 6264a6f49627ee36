//! Tunables for a search aggregation run.
//!
//! [`SearchConfig`] controls result counts, timeouts, politeness and the
//! relevance threshold. The defaults reproduce a slow, polite, sequential
//! pipeline; raise `max_concurrent_fetches` for throughput.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::SearchError;

/// Upper bound accepted for `max_results`.
pub const MAX_RESULTS_LIMIT: usize = 50;

/// Configuration for a search aggregation.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Default number of results when the caller does not ask for a count.
    pub max_results: usize,
    /// Per-request HTTP timeout in seconds (backends and page fetches).
    pub timeout_seconds: u64,
    /// Delay applied after every successful page fetch, in milliseconds.
    pub politeness_delay_ms: u64,
    /// Minimum number of distinct lexicon keywords a page must contain.
    pub min_keyword_matches: usize,
    /// Number of candidate pages fetched at once. `1` fetches sequentially.
    pub max_concurrent_fetches: usize,
    /// Requests per minute allowed against a single host. `0` disables
    /// host-level throttling.
    pub per_host_requests_per_minute: u32,
    /// Deadline for an entire search call. `None` relies on per-request
    /// timeouts only.
    pub search_timeout_seconds: Option<u64>,
    /// How long verified result sets are cached. `0` disables caching.
    pub cache_ttl_seconds: u64,
    /// Whether to request safe search from engines that support it.
    pub safe_search: bool,
    /// JSON file of header profiles. `None` uses the built-in profiles.
    pub headers_path: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 3,
            timeout_seconds: 15,
            politeness_delay_ms: 1000,
            min_keyword_matches: 3,
            max_concurrent_fetches: 1,
            per_host_requests_per_minute: 30,
            search_timeout_seconds: None,
            cache_ttl_seconds: 0,
            safe_search: true,
            headers_path: None,
        }
    }
}

impl SearchConfig {
    /// Reject settings that would make a search meaningless.
    ///
    /// Result count, request timeout, keyword threshold and fetch
    /// concurrency must all be non-zero. `max_results` may not exceed
    /// [`MAX_RESULTS_LIMIT`]. A search deadline, when set, must be non-zero.
    pub fn validate(&self) -> Result<(), SearchError> {
        let non_zero = [
            ("max_results", self.max_results as u64),
            ("timeout_seconds", self.timeout_seconds),
            ("min_keyword_matches", self.min_keyword_matches as u64),
            ("max_concurrent_fetches", self.max_concurrent_fetches as u64),
        ];
        if let Some((field, _)) = non_zero.iter().find(|(_, value)| *value == 0) {
            return Err(SearchError::Config(format!(
                "{field} must be greater than 0"
            )));
        }
        if self.max_results > MAX_RESULTS_LIMIT {
            return Err(SearchError::Config(format!(
                "max_results must be at most {MAX_RESULTS_LIMIT}"
            )));
        }
        if self.search_timeout_seconds == Some(0) {
            return Err(SearchError::Config(
                "search_timeout_seconds must be greater than 0 when set".into(),
            ));
        }
        Ok(())
    }

    /// Per-request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Politeness delay as a [`Duration`].
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}
