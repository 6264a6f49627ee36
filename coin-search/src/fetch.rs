//! Page fetching: one GET per candidate, turned into a [`FetchOutcome`].
//!
//! Every request carries a randomly picked [`HeaderProfile`](crate::headers::HeaderProfile).
//! Nothing here returns an error for an ordinary bad page; callers get a
//! typed failure outcome and treat the candidate as irrelevant.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;

use crate::config::SearchConfig;
use crate::content;
use crate::error::{Result, SearchError};
use crate::headers::HeaderPool;
use crate::http;
use crate::rng::SharedRng;
use crate::throttle::HostThrottle;
use crate::types::FetchOutcome;

/// Content types accepted as HTML. A response without a content type is
/// parsed as HTML too.
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Fetches candidate pages and extracts their main text.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    headers: Arc<HeaderPool>,
    rng: SharedRng,
    politeness_delay: Duration,
    throttle: Option<Arc<HostThrottle>>,
}

impl PageFetcher {
    /// Build a fetcher using the timeout, politeness delay and per-host
    /// budget from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig, headers: Arc<HeaderPool>, rng: SharedRng) -> Result<Self> {
        Ok(Self {
            client: http::build_client(config)?,
            headers,
            rng,
            politeness_delay: config.politeness_delay(),
            throttle: HostThrottle::new(config.per_host_requests_per_minute).map(Arc::new),
        })
    }

    /// Override the delay applied after each successful fetch.
    pub fn with_politeness_delay(mut self, delay: Duration) -> Self {
        self.politeness_delay = delay;
        self
    }

    /// Delay applied after each successful fetch.
    pub fn politeness_delay(&self) -> Duration {
        self.politeness_delay
    }

    /// Fetch `url` and extract the text of its main content region.
    ///
    /// Network-level problems (connect/DNS errors, timeouts, non-2xx
    /// status, body read errors) give [`FetchOutcome::NetworkFailure`].
    /// A non-HTML response or an extraction error gives
    /// [`FetchOutcome::ProcessingFailure`]. On success the politeness delay
    /// is slept before returning.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let response = match self.send(url).await {
            Ok(response) => response,
            Err(reason) => {
                tracing::warn!(url, %reason, "network error fetching page");
                return FetchOutcome::NetworkFailure(reason);
            }
        };

        if let Some(content_type) = non_html_content_type(&response) {
            tracing::warn!(url, content_type = %content_type, "page is not HTML");
            return FetchOutcome::ProcessingFailure(format!(
                "unsupported content type: {content_type}"
            ));
        }

        let html = match response.text().await {
            Ok(html) => html,
            Err(e) => {
                let reason = format!("failed to read response body: {e}");
                tracing::warn!(url, %reason, "network error fetching page");
                return FetchOutcome::NetworkFailure(reason);
            }
        };

        let text = match content::extract_main_text(&html) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(url, error = %e, "error processing page");
                return FetchOutcome::ProcessingFailure(e.to_string());
            }
        };

        tracing::debug!(url, chars = text.len(), "page text extracted");
        tokio::time::sleep(self.politeness_delay).await;
        FetchOutcome::Content(text)
    }

    /// Fetch `url` again and return its cleaned `<title>`.
    ///
    /// The body is read whatever the status code, so an error page that
    /// still names itself yields a title. No politeness delay is applied.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the page cannot be fetched, or
    /// [`SearchError::Parse`] if it has no usable title.
    pub async fn fetch_title(&self, url: &str) -> Result<String> {
        let response = self.request(url).await.map_err(SearchError::Http)?;
        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("failed to read response body: {e}")))?;
        content::extract_title(&html)
            .ok_or_else(|| SearchError::Parse(format!("no title found at {url}")))
    }

    /// Issue one throttled GET with a fresh header profile, requiring 2xx.
    async fn send(&self, url: &str) -> std::result::Result<reqwest::Response, String> {
        self.request(url)
            .await?
            .error_for_status()
            .map_err(|e| describe_request_error(&e))
    }

    /// Issue one throttled GET with a fresh header profile, any status.
    async fn request(&self, url: &str) -> std::result::Result<reqwest::Response, String> {
        if let Some(ref throttle) = self.throttle {
            throttle.wait_for(url).await;
        }

        let profile = self.rng.with(|rng| self.headers.pick(rng));

        http::get_with_profile(&self.client, url, profile)
            .send()
            .await
            .map_err(|e| describe_request_error(&e))
    }
}

/// Human-readable reason for a failed request.
fn describe_request_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if let Some(status) = err.status() {
        format!("HTTP {status}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        format!("request failed: {err}")
    }
}

/// The response's media type if it is present and not HTML.
fn non_html_content_type(response: &reqwest::Response) -> Option<String> {
    let raw = response.headers().get(CONTENT_TYPE)?.to_str().ok()?;
    let media_type = raw.split(';').next().unwrap_or_default().trim().to_lowercase();
    if media_type.is_empty() || HTML_CONTENT_TYPES.contains(&media_type.as_str()) {
        None
    } else {
        Some(media_type)
    }
}
