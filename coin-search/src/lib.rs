//! # coin-search
//!
//! Web search for coin identification: find pages that talk about a coin
//! and keep only those that actually read as numismatic content.
//!
//! No API keys are involved. Public search engines are scraped directly
//! and every candidate page is fetched and checked before it is returned.
//!
//! ## Design
//!
//! - Scrapes Google and DuckDuckGo using CSS selectors on HTML responses
//! - Queries both engines concurrently and merges their hits, first seen wins
//! - Fetches each candidate page with a rotated browser header profile,
//!   extracts its main content region and discards noise elements
//! - Keeps a page only if its text mentions enough coin-related keywords
//! - Shuffles the verified set so no engine is systematically ranked first
//! - Graceful degradation: if one engine fails, the other still returns results
//!
//! ## Security
//!
//! - No API keys or secrets to leak
//! - No network listeners: this is a library, not a server
//! - Search queries are logged only at trace level

pub mod cache;
pub mod config;
pub mod content;
pub mod engine;
pub mod engines;
pub mod error;
pub mod fetch;
pub mod headers;
pub mod http;
pub mod orchestrator;
pub mod relevance;
pub mod rng;
pub mod text;
pub mod throttle;
pub mod types;

pub use config::SearchConfig;
pub use engine::SearchBackend;
pub use error::{Result, SearchError};
pub use fetch::PageFetcher;
pub use headers::{HeaderPool, HeaderProfile};
pub use orchestrator::SearchAggregator;
pub use relevance::RelevanceFilter;
pub use rng::SharedRng;
pub use text::clean_text;
pub use types::{FetchOutcome, RawHit, SearchEngine, SearchResult};

/// Search Google and DuckDuckGo and return verified coin pages.
///
/// Builds a one-off [`SearchAggregator`] from `config` and returns up to
/// `config.max_results` verified results in random order. Hold on to a
/// [`SearchAggregator`] instead when searching repeatedly, so the HTTP
/// clients, throttle and cache are reused.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an invalid configuration and
/// [`SearchError::AllEnginesFailed`] if every engine fails. Individual
/// engine and page failures are logged but do not fail the search.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> coin_search::Result<()> {
/// let config = coin_search::SearchConfig::default();
/// let results = coin_search::search("Gupta gold dinar coin numismatics", &config).await?;
/// for result in &results {
///     println!("{}: {}", result.title, result.link);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(query: &str, config: &SearchConfig) -> Result<Vec<SearchResult>> {
    let aggregator = SearchAggregator::new(config)?;
    aggregator.search(query, config.max_results).await
}

/// Search with the default configuration.
///
/// Convenience wrapper around [`search`] using [`SearchConfig::default()`].
///
/// # Errors
///
/// Same as [`search`].
pub async fn search_default(query: &str) -> Result<Vec<SearchResult>> {
    search(query, &SearchConfig::default()).await
}

/// Fetch one page and extract its main text.
///
/// Uses the built-in header profiles and the default timeout. Failures come
/// back as [`FetchOutcome`] variants rather than errors.
///
/// # Errors
///
/// Returns [`SearchError::Config`] or [`SearchError::Http`] only if the
/// fetcher itself cannot be built.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> coin_search::Result<()> {
/// let outcome = coin_search::fetch_page_text("https://example.com").await?;
/// println!("{}", outcome.display_text());
/// # Ok(())
/// # }
/// ```
pub async fn fetch_page_text(url: &str) -> Result<FetchOutcome> {
    let config = SearchConfig::default();
    let headers = std::sync::Arc::new(HeaderPool::load(&config)?);
    let fetcher = PageFetcher::new(&config, headers, SharedRng::from_entropy())?;
    Ok(fetcher.fetch(url).await)
}
