//! Search aggregation: concurrent backend queries, dedup, page
//! verification, shuffling.
//!
//! This module fans a query out to every backend, merges the hits into a
//! deduplicated candidate list, fetches and keyword-checks each candidate
//! page, and returns a shuffled, truncated set of verified results.

pub mod dedup;
pub mod search;

pub use search::{shuffle_and_truncate, SearchAggregator, NO_TITLE_PLACEHOLDER};
