//! Core types for search hits, verified results and fetch outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder text shown in place of page content when a fetch failed
/// at the network level.
pub const NETWORK_FAILURE_MARKER: &str = "[Error: Could not fetch content due to network issue.]";

/// Placeholder text shown in place of page content when a page was
/// fetched but could not be processed.
pub const PROCESSING_FAILURE_MARKER: &str = "[Error: Could not process the page content.]";

/// Supported search backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchEngine {
    /// Google: general web search, yields links and titles only.
    Google,
    /// DuckDuckGo HTML endpoint: yields titles and snippets.
    DuckDuckGo,
}

impl SearchEngine {
    /// Returns the human-readable name of this engine.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::DuckDuckGo => "DuckDuckGo",
        }
    }

    /// Returns all available engine variants in query order.
    pub fn all() -> &'static [SearchEngine] {
        &[Self::Google, Self::DuckDuckGo]
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw hit as yielded by a search backend, before verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHit {
    /// Target URL of the hit.
    pub url: String,
    /// Title as shown by the engine; empty when the engine does not provide one.
    pub title: String,
    /// Engine-provided snippet; empty when the engine does not provide one.
    pub snippet: String,
}

impl RawHit {
    /// A hit carrying only a link.
    pub fn link_only(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            snippet: String::new(),
        }
    }
}

/// A search result that survived deduplication and, once `full_text` is
/// populated, relevance verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The page URL. Unique within one aggregation run.
    pub link: String,
    /// The engine that first reported this link.
    pub engine: SearchEngine,
    /// Page title, backfilled from the page when the engine gave none.
    pub title: String,
    /// Engine snippet, only populated by engines that provide one.
    pub snippet: String,
    /// Extracted page text. Always populated on returned results.
    pub full_text: String,
}

impl SearchResult {
    /// Build an unverified candidate from a backend hit.
    pub fn candidate(hit: RawHit, engine: SearchEngine) -> Self {
        Self {
            link: hit.url,
            engine,
            title: hit.title,
            snippet: hit.snippet,
            full_text: String::new(),
        }
    }
}

/// Outcome of fetching and extracting a single page.
///
/// Failures are values, not errors: a failed candidate simply contributes
/// nothing to the aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Cleaned text of the page's main content region.
    Content(String),
    /// Transport error, timeout or non-success status.
    NetworkFailure(String),
    /// The page arrived but could not be turned into text.
    ProcessingFailure(String),
}

impl FetchOutcome {
    /// Extracted text, if the fetch succeeded.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Content(text) => Some(text),
            Self::NetworkFailure(_) | Self::ProcessingFailure(_) => None,
        }
    }

    /// Whether this outcome is a failure of either kind.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Content(_))
    }

    /// Text suitable for display: the content itself, or a failure marker.
    pub fn display_text(&self) -> &str {
        match self {
            Self::Content(text) => text,
            Self::NetworkFailure(_) => NETWORK_FAILURE_MARKER,
            Self::ProcessingFailure(_) => PROCESSING_FAILURE_MARKER,
        }
    }
}
