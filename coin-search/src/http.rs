//! Shared HTTP client for backend queries and page fetches.
//!
//! The client carries no default User-Agent: every request attaches a
//! [`HeaderProfile`] picked from the pool, so identity rotates per request
//! rather than per client.

use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::headers::HeaderProfile;

/// Build a [`reqwest::Client`] configured for scraping.
///
/// The client has:
/// - Cookie store enabled (for consent pages)
/// - Per-request timeout from config
/// - At most 10 redirects
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    build_client_with_timeout(config.timeout())
}

/// Same as [`build_client`] with an explicit timeout.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client_with_timeout(timeout: Duration) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Start a GET request carrying the given header profile.
pub fn get_with_profile(
    client: &reqwest::Client,
    url: &str,
    profile: &HeaderProfile,
) -> reqwest::RequestBuilder {
    client.get(url).headers(profile.header_map())
}
