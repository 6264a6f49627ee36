//! Candidate merging with first-seen deduplication by link.
//!
//! Backends are merged in the order given. A link already seen, from any
//! engine, is dropped, so each candidate is attributed to the engine that
//! reported it first. Links are compared by a normalised key so trivially
//! different spellings of one page collapse together; the surviving
//! candidate keeps its link exactly as first reported.

use std::collections::HashSet;

use url::form_urlencoded;
use url::Url;

use crate::types::{RawHit, SearchEngine, SearchResult};

/// Query parameters that never change which page is served.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "msclkid",
];

/// Merge per-engine hits into one candidate list, first seen wins.
///
/// Hits with a blank link are skipped.
pub fn merge_candidates(per_engine: Vec<(SearchEngine, Vec<RawHit>)>) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();

    for (engine, hits) in per_engine {
        for hit in hits {
            let link = hit.url.trim();
            if link.is_empty() {
                continue;
            }
            if !seen.insert(link_key(link)) {
                tracing::trace!(link, %engine, "duplicate link dropped");
                continue;
            }
            candidates.push(SearchResult::candidate(hit, engine));
        }
    }

    candidates
}

/// Comparison key for a link.
///
/// Lowercases scheme and host, drops default ports, the fragment,
/// tracking parameters and a trailing path slash, and sorts the remaining
/// query pairs. Unparseable links are compared verbatim.
pub fn link_key(link: &str) -> String {
    let Ok(mut url) = Url::parse(link) else {
        return link.to_owned();
    };

    url.set_fragment(None);

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_ascii_lowercase().as_str()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    pairs.sort();

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&pairs)
            .finish();
        url.set_query(Some(&query));
    }

    let path = url.path().to_owned();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    // `Url` already lowercases scheme and host and omits default ports.
    url.to_string()
}
