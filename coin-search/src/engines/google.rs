//! Google search engine: general web search, links first.
//!
//! Scrapes the JavaScript-free results page. Google only reliably exposes
//! result links there; titles are taken when present and left empty
//! otherwise, to be backfilled from the page itself. No snippets.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use crate::config::SearchConfig;
use crate::engine::SearchBackend;
use crate::error::SearchError;
use crate::headers::HeaderPool;
use crate::http;
use crate::rng::SharedRng;
use crate::text::clean_text;
use crate::types::{RawHit, SearchEngine};

const DEFAULT_BASE_URL: &str = "https://www.google.com";

/// Largest `num` Google honours for one results page.
const MAX_RESULTS_PER_PAGE: usize = 100;

/// Google HTML search scraper.
pub struct GoogleEngine {
    client: reqwest::Client,
    headers: Arc<HeaderPool>,
    rng: SharedRng,
    base_url: String,
    safe_search: bool,
}

impl GoogleEngine {
    /// Build the engine with the timeout and safe search setting from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(
        config: &SearchConfig,
        headers: Arc<HeaderPool>,
        rng: SharedRng,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(config)?,
            headers,
            rng,
            base_url: DEFAULT_BASE_URL.to_owned(),
            safe_search: config.safe_search,
        })
    }

    /// Point the engine at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Resolve a result anchor's `href` to the target URL.
    ///
    /// Unwraps `/url?q=<target>&sa=...` redirects and drops links back into
    /// Google itself (other verticals, cached copies, account pages).
    fn extract_url(href: &str) -> Option<String> {
        if href.starts_with("/url?") {
            let wrapped = Url::parse(&format!("{DEFAULT_BASE_URL}{href}")).ok()?;
            let target = wrapped
                .query_pairs()
                .find(|(key, _)| key == "q" || key == "url")
                .map(|(_, value)| value.into_owned())?;
            return Self::extract_url(&target);
        }

        let parsed = Url::parse(href).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }
        let host = parsed.host_str()?;
        if is_google_host(host) {
            return None;
        }
        Some(href.to_owned())
    }
}

fn is_google_host(host: &str) -> bool {
    let host = host.trim_start_matches("www.");
    host.starts_with("google.")
        || host.ends_with(".google.com")
        || host == "googleusercontent.com"
        || host.ends_with(".googleusercontent.com")
}

#[async_trait]
impl SearchBackend for GoogleEngine {
    async fn query(&self, query: &str, count: usize) -> Result<Vec<RawHit>, SearchError> {
        tracing::trace!(query, "Google search");

        // Ask for a couple extra so filtered internal links don't starve the count.
        let num = count
            .saturating_add(2)
            .min(MAX_RESULTS_PER_PAGE)
            .to_string();
        let mut params = vec![("q", query), ("num", num.as_str()), ("hl", "en")];
        if self.safe_search {
            params.push(("safe", "active"));
        }

        let profile = self.rng.with(|rng| self.headers.pick(rng));

        let endpoint = format!("{}/search", self.base_url);
        let response = http::get_with_profile(&self.client, &endpoint, profile)
            .query(&params)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("Google request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("Google HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("Google response read failed: {e}")))?;

        tracing::trace!(bytes = html.len(), "Google response received");

        parse_google_html(&html, count)
    }

    fn engine(&self) -> SearchEngine {
        SearchEngine::Google
    }
}

/// Parse a Google results page into raw hits.
///
/// Handles both the classic `div.g` layout and the basic-HTML `div.ezO2md`
/// layout served to clients without JavaScript.
pub(crate) fn parse_google_html(html: &str, max_results: usize) -> Result<Vec<RawHit>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse("div.g, div.ezO2md")
        .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let link_sel = Selector::parse("a[href]")
        .map_err(|e| SearchError::Parse(format!("invalid link selector: {e:?}")))?;
    let title_sel = Selector::parse("h3, span.CVA68e")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;

    let mut hits: Vec<RawHit> = Vec::new();

    for element in document.select(&result_sel) {
        if hits.len() >= max_results {
            break;
        }

        let Some(url) = element
            .select(&link_sel)
            .filter_map(|a| a.value().attr("href"))
            .find_map(GoogleEngine::extract_url)
        else {
            continue;
        };

        // Nested div.g blocks report the same link twice.
        if hits.iter().any(|hit| hit.url == url) {
            continue;
        }

        let title = element
            .select(&title_sel)
            .next()
            .map(|el| clean_text(&el.text().collect::<String>()))
            .unwrap_or_default();

        hits.push(RawHit {
            url,
            title,
            snippet: String::new(),
        });
    }

    tracing::debug!(count = hits.len(), "Google results parsed");
    Ok(hits)
}
