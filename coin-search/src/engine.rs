//! Trait definition for pluggable search backends.
//!
//! The aggregator only sees [`SearchBackend`] trait objects, so another
//! engine is added by implementing the trait and handing it over; the
//! aggregation pipeline itself does not change.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::{RawHit, SearchEngine};

/// A search engine that turns a text query into raw hits.
///
/// Implementors handle their own URL construction, request headers, HTML
/// parsing and redirect unwrapping. Must be `Send + Sync` so backends can
/// be queried concurrently.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Query the engine for up to `count` hits.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails or the response
    /// cannot be parsed. The aggregator logs the error and carries on
    /// without this backend.
    async fn query(&self, query: &str, count: usize) -> Result<Vec<RawHit>, SearchError>;

    /// Which engine this backend represents; used for result attribution.
    fn engine(&self) -> SearchEngine;
}
