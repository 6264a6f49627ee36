//! DuckDuckGo search engine: titles and snippets from the no-script endpoint.
//!
//! Queries are POSTed as a form to `/html/` on `html.duckduckgo.com`, the
//! page served to browsers without JavaScript. Sponsored results are
//! skipped.

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

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com";

/// DuckDuckGo HTML search scraper.
pub struct DuckDuckGoEngine {
    client: reqwest::Client,
    headers: Arc<HeaderPool>,
    rng: SharedRng,
    base_url: String,
    safe_search: bool,
}

impl DuckDuckGoEngine {
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
    /// Organic links arrive wrapped as
    /// `//duckduckgo.com/l/?uddg=<percent-encoded target>&rut=...`; the
    /// `uddg` value is the target. Direct links pass through unchanged.
    /// Anything that is not an absolute http(s) URL is dropped.
    fn extract_url(href: &str) -> Option<String> {
        let absolute = match href.strip_prefix("//") {
            Some(rest) => format!("https://{rest}"),
            None => href.to_owned(),
        };
        let parsed = Url::parse(&absolute).ok()?;

        let is_redirect = parsed
            .host_str()
            .is_some_and(|host| host == "duckduckgo.com" || host.ends_with(".duckduckgo.com"))
            && parsed.path().starts_with("/l/");

        if is_redirect {
            return parsed
                .query_pairs()
                .find_map(|(key, value)| (key == "uddg").then(|| value.into_owned()));
        }

        matches!(parsed.scheme(), "http" | "https").then_some(absolute)
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoEngine {
    async fn query(&self, query: &str, count: usize) -> Result<Vec<RawHit>, SearchError> {
        tracing::trace!(query, "DuckDuckGo search");

        let mut params = vec![("q", query)];
        if self.safe_search {
            params.push(("kp", "1"));
        }

        let profile = self.rng.with(|rng| self.headers.pick(rng));

        let response = self
            .client
            .post(format!("{}/html/", self.base_url))
            .headers(profile.header_map())
            .form(&params)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("DuckDuckGo request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("DuckDuckGo HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("DuckDuckGo response read failed: {e}")))?;

        tracing::trace!(bytes = html.len(), "DuckDuckGo response received");

        parse_duckduckgo_html(&html, count)
    }

    fn engine(&self) -> SearchEngine {
        SearchEngine::DuckDuckGo
    }
}

/// Parse DuckDuckGo HTML response into raw hits.
pub(crate) fn parse_duckduckgo_html(html: &str, max_results: usize) -> Result<Vec<RawHit>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )
    .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut hits = Vec::new();

    for element in document.select(&result_sel) {
        if hits.len() >= max_results {
            break;
        }

        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let Some(url) = title_el
            .value()
            .attr("href")
            .and_then(DuckDuckGoEngine::extract_url)
        else {
            continue;
        };

        let title = clean_text(&title_el.text().collect::<String>());

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| clean_text(&el.text().collect::<String>()))
            .unwrap_or_default();

        hits.push(RawHit {
            url,
            title,
            snippet,
        });
    }

    tracing::debug!(count = hits.len(), "DuckDuckGo results parsed");
    Ok(hits)
}
