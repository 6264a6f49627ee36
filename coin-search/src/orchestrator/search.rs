//! Search aggregation: query backends, dedup, verify pages, shuffle, truncate.
//!
//! # Pipeline
//!
//! 1. Query every backend for `max_results` hits (concurrently; merged in
//!    backend order). A failing backend is logged and skipped.
//! 2. Merge hits into candidates, first-seen link wins.
//! 3. Fetch every candidate page through a bounded worker pool and keep
//!    only pages that pass the relevance filter.
//! 4. Backfill empty titles from the page itself.
//! 5. Shuffle the verified set and truncate to `max_results`.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cache::{CacheKey, ResultCache};
use crate::config::SearchConfig;
use crate::engine::SearchBackend;
use crate::engines::{DuckDuckGoEngine, GoogleEngine};
use crate::error::{Result, SearchError};
use crate::fetch::PageFetcher;
use crate::headers::HeaderPool;
use crate::relevance::RelevanceFilter;
use crate::rng::SharedRng;
use crate::types::{FetchOutcome, RawHit, SearchEngine, SearchResult};

use super::dedup::merge_candidates;

/// Title used when a verified page's title cannot be recovered.
pub const NO_TITLE_PLACEHOLDER: &str = "No Title Found";

/// Multi-backend search with page verification.
pub struct SearchAggregator {
    backends: Vec<Box<dyn SearchBackend>>,
    fetcher: PageFetcher,
    filter: RelevanceFilter,
    rng: SharedRng,
    max_concurrent_fetches: usize,
    search_timeout: Option<Duration>,
    cache: Option<ResultCache>,
}

impl SearchAggregator {
    /// Build the standard Google + DuckDuckGo aggregator from `config`,
    /// drawing randomness from OS entropy.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for an invalid configuration or
    /// header profile resource, or [`SearchError::Http`] if an HTTP client
    /// cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        Self::with_rng(config, SharedRng::from_entropy())
    }

    /// Same as [`SearchAggregator::new`] with an injected random source.
    ///
    /// # Errors
    ///
    /// Same as [`SearchAggregator::new`].
    pub fn with_rng(config: &SearchConfig, rng: SharedRng) -> Result<Self> {
        config.validate()?;
        let headers = Arc::new(HeaderPool::load(config)?);

        let backends: Vec<Box<dyn SearchBackend>> = vec![
            Box::new(GoogleEngine::new(config, Arc::clone(&headers), rng.clone())?),
            Box::new(DuckDuckGoEngine::new(config, Arc::clone(&headers), rng.clone())?),
        ];
        let fetcher = PageFetcher::new(config, headers, rng.clone())?;

        Ok(Self::from_parts(
            backends,
            fetcher,
            RelevanceFilter::new(config.min_keyword_matches),
            rng,
        )
        .with_max_concurrent_fetches(config.max_concurrent_fetches)
        .with_search_timeout(config.search_timeout_seconds.map(Duration::from_secs))
        .with_cache(ResultCache::new(config.cache_ttl_seconds)))
    }

    /// Assemble an aggregator from explicit parts.
    ///
    /// Backends are queried, and their hits merged, in the given order.
    /// Fetches run sequentially until [`with_max_concurrent_fetches`]
    /// says otherwise.
    ///
    /// [`with_max_concurrent_fetches`]: SearchAggregator::with_max_concurrent_fetches
    pub fn from_parts(
        backends: Vec<Box<dyn SearchBackend>>,
        fetcher: PageFetcher,
        filter: RelevanceFilter,
        rng: SharedRng,
    ) -> Self {
        Self {
            backends,
            fetcher,
            filter,
            rng,
            max_concurrent_fetches: 1,
            search_timeout: None,
            cache: None,
        }
    }

    /// Number of candidate pages fetched at once (minimum 1).
    pub fn with_max_concurrent_fetches(mut self, workers: usize) -> Self {
        self.max_concurrent_fetches = workers.max(1);
        self
    }

    /// Deadline for a whole [`search`](SearchAggregator::search) call.
    pub fn with_search_timeout(mut self, limit: Option<Duration>) -> Self {
        self.search_timeout = limit;
        self
    }

    /// Cache verified sets between calls. `None` disables caching.
    pub fn with_cache(mut self, cache: Option<ResultCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Engines in query order.
    pub fn engines(&self) -> Vec<SearchEngine> {
        self.backends.iter().map(|backend| backend.engine()).collect()
    }

    /// Search all backends and return up to `max_results` verified results
    /// in random order.
    ///
    /// Fewer results come back when too few pages pass verification.
    /// Per-candidate failures never surface as errors.
    ///
    /// # Errors
    ///
    /// - [`SearchError::AllEnginesFailed`] if every backend failed.
    /// - [`SearchError::Timeout`] if the configured deadline elapsed.
    /// - [`SearchError::Config`] if no backends are configured.
    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        if max_results == 0 {
            return Ok(Vec::new());
        }
        if self.backends.is_empty() {
            return Err(SearchError::Config("no search backends configured".into()));
        }

        match self.search_timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(query, max_results))
                .await
                .map_err(|_| {
                    SearchError::Timeout(format!("exceeded {}s limit", limit.as_secs()))
                })?,
            None => self.run(query, max_results).await,
        }
    }

    async fn run(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let key = CacheKey::new(query, &self.engines(), max_results);

        let cached = match self.cache {
            Some(ref cache) => cache.get(&key).await,
            None => None,
        };

        let verified = match cached {
            Some(verified) => {
                tracing::debug!(count = verified.len(), "verified results served from cache");
                verified
            }
            None => {
                let verified = self.collect_verified(query, max_results).await?;
                if let Some(ref cache) = self.cache {
                    cache.insert(key, verified.clone()).await;
                }
                verified
            }
        };

        let results = self.rng.with(|rng| shuffle_and_truncate(verified, max_results, rng));
        tracing::info!(returned = results.len(), "search complete");
        Ok(results)
    }

    /// Steps 1–4: every verified candidate, in candidate order.
    async fn collect_verified(&self, query: &str, count: usize) -> Result<Vec<SearchResult>> {
        let per_engine = self.query_backends(query, count).await?;
        let candidates = merge_candidates(per_engine);

        tracing::info!(
            candidates = candidates.len(),
            "fetching and verifying candidate pages"
        );

        // `buffered` yields in input order, so the kept set does not depend
        // on which fetch finishes first.
        let verified: Vec<SearchResult> = stream::iter(candidates)
            .map(|candidate| self.verify(candidate))
            .buffered(self.max_concurrent_fetches)
            .filter_map(|kept| async move { kept })
            .collect()
            .await;

        tracing::info!(verified = verified.len(), "relevant pages kept");
        Ok(verified)
    }

    /// Query every backend, isolating failures.
    async fn query_backends(
        &self,
        query: &str,
        count: usize,
    ) -> Result<Vec<(SearchEngine, Vec<RawHit>)>> {
        let queries = self.backends.iter().map(|backend| async move {
            tracing::info!(engine = %backend.engine(), "querying search engine");
            (backend.engine(), backend.query(query, count).await)
        });
        let outcomes = futures::future::join_all(queries).await;

        let mut per_engine = Vec::with_capacity(outcomes.len());
        let mut errors: Vec<String> = Vec::new();

        for (engine, outcome) in outcomes {
            match outcome {
                Ok(hits) => {
                    tracing::debug!(%engine, count = hits.len(), "engine returned hits");
                    per_engine.push((engine, hits));
                }
                Err(err) => {
                    tracing::warn!(%engine, error = %err, "engine query failed");
                    errors.push(format!("{engine}: {err}"));
                }
            }
        }

        if per_engine.is_empty() && !errors.is_empty() {
            return Err(SearchError::AllEnginesFailed(errors.join("; ")));
        }

        Ok(per_engine)
    }

    /// Fetch one candidate; keep it with its text if relevant.
    async fn verify(&self, mut candidate: SearchResult) -> Option<SearchResult> {
        let outcome = self.fetcher.fetch(&candidate.link).await;

        if !self.filter.accepts(&outcome) {
            tracing::debug!(
                link = %candidate.link,
                matched = ?outcome.text().map(|text| self.filter.matched_keywords(text)),
                "fetch failed or content not relevant, discarding"
            );
            return None;
        }

        let FetchOutcome::Content(text) = outcome else {
            return None;
        };

        tracing::debug!(link = %candidate.link, "content relevant");
        candidate.full_text = text;

        if candidate.title.is_empty() {
            candidate.title = match self.fetcher.fetch_title(&candidate.link).await {
                Ok(title) => title,
                Err(err) => {
                    tracing::warn!(link = %candidate.link, error = %err, "title backfill failed");
                    NO_TITLE_PLACEHOLDER.to_owned()
                }
            };
        }

        Some(candidate)
    }
}

impl std::fmt::Debug for SearchAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchAggregator")
            .field("engines", &self.engines())
            .field("filter", &self.filter)
            .field("max_concurrent_fetches", &self.max_concurrent_fetches)
            .field("search_timeout", &self.search_timeout)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Uniformly shuffle `results` and keep the first `max_results`.
pub fn shuffle_and_truncate<R: Rng + ?Sized>(
    mut results: Vec<SearchResult>,
    max_results: usize,
    rng: &mut R,
) -> Vec<SearchResult> {
    results.shuffle(rng);
    results.truncate(max_results);
    results
}
