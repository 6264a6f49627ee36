//! Topical relevance check against a fixed numismatic keyword lexicon.

use crate::types::FetchOutcome;

/// Lowercase keywords that mark a page as being about coins.
pub const COIN_KEYWORDS: &[&str] = &[
    "numismatic",
    "coin",
    "mint",
    "obverse",
    "reverse",
    "dynasty",
    "ruler",
    "bullion",
    "drachm",
    "tetradrachm",
    "aureus",
    "denarius",
    "ancient",
    "currency",
    "collection",
    "emperor",
    "king",
];

/// Default number of distinct keywords a page must contain.
pub const DEFAULT_MIN_MATCHES: usize = 3;

/// Accepts text that mentions enough distinct lexicon keywords.
///
/// Matching is case-insensitive substring search, so `"coins"` counts
/// for `coin` and `"tetradrachm"` counts for both `drachm` and
/// `tetradrachm`.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    keywords: &'static [&'static str],
    min_matches: usize,
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_MATCHES)
    }
}

impl RelevanceFilter {
    /// Filter over [`COIN_KEYWORDS`] with the given threshold.
    pub fn new(min_matches: usize) -> Self {
        Self {
            keywords: COIN_KEYWORDS,
            min_matches,
        }
    }

    /// The required number of distinct matches.
    pub fn min_matches(&self) -> usize {
        self.min_matches
    }

    /// Lexicon keywords found in `text`, in lexicon order.
    pub fn matched_keywords(&self, text: &str) -> Vec<&'static str> {
        if text.is_empty() {
            return Vec::new();
        }
        let lower = text.to_lowercase();
        self.keywords
            .iter()
            .copied()
            .filter(|keyword| lower.contains(keyword))
            .collect()
    }

    /// Whether `text` contains at least `min_matches` distinct keywords.
    pub fn is_relevant(&self, text: &str) -> bool {
        !text.is_empty() && self.matched_keywords(text).len() >= self.min_matches
    }

    /// Whether a fetch outcome carries relevant content. Failures never do.
    pub fn accepts(&self, outcome: &FetchOutcome) -> bool {
        outcome.text().is_some_and(|text| self.is_relevant(text))
    }
}
