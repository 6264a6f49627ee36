//! Turn a classifier label or a free-text query into a web-verified report.
//!
//! The classifier itself lives elsewhere; it hands over a [`Prediction`].
//! Search failures other than configuration errors never fail a report.
//! When every engine fails the report carries no web results and no error
//! message; any other search failure is reported in the `error` field.

use coin_search::{SearchAggregator, SearchError, SearchResult};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Suffix appended to every label or query before searching.
pub const QUERY_SUFFIX: &str = "coin numismatics";

/// Message reported when a web search fails for a non-configuration reason.
pub const WEB_SEARCH_FAILED: &str = "An error occurred during web search.";

/// Output of the image classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted coin class, e.g. `"Gupta"`.
    pub predicted_class: String,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Prediction {
    /// Build a prediction, rejecting a blank label or an out-of-range confidence.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidInput`] for a blank label or a confidence
    /// outside `[0, 1]`.
    pub fn new(predicted_class: impl Into<String>, confidence: f64) -> Result<Self> {
        let predicted_class = predicted_class.into();
        if predicted_class.trim().is_empty() {
            return Err(AppError::InvalidInput("predicted class is empty".into()));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(AppError::InvalidInput(format!(
                "confidence {confidence} is outside [0, 1]"
            )));
        }
        Ok(Self {
            predicted_class,
            confidence,
        })
    }
}

/// Report for an image identification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyReport {
    /// What the classifier said.
    pub ai_prediction: Prediction,
    /// Coin catalogue matches. Always empty: no catalogue is consulted.
    pub database_results: Vec<serde_json::Value>,
    /// Verified web pages about the predicted coin.
    pub web_results: Vec<SearchResult>,
    /// Set when the web search failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Report for a free-text search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    /// Coin catalogue matches. Always empty: no catalogue is consulted.
    pub database_results: Vec<serde_json::Value>,
    /// Verified web pages about the query.
    pub web_results: Vec<SearchResult>,
    /// Set when the web search failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Web query for a classifier label: `"<label> coin numismatics"`.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] for a blank label.
pub fn web_query_for_label(label: &str) -> Result<String> {
    build_query(label, "label")
}

/// Web query for user text: `"<text> coin numismatics"`.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] for blank text.
pub fn web_query_for_text(text: &str) -> Result<String> {
    build_query(text, "query")
}

fn build_query(subject: &str, what: &str) -> Result<String> {
    let subject = coin_search::clean_text(subject);
    if subject.is_empty() {
        return Err(AppError::InvalidInput(format!("{what} is empty")));
    }
    Ok(format!("{subject} {QUERY_SUFFIX}"))
}

/// Search the web for the predicted coin and assemble the report.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] for a blank label, and
/// [`AppError::Search`] only for configuration errors.
pub async fn identify(
    aggregator: &SearchAggregator,
    prediction: Prediction,
    max_results: usize,
) -> Result<IdentifyReport> {
    let query = web_query_for_label(&prediction.predicted_class)?;
    tracing::info!(
        predicted_class = %prediction.predicted_class,
        confidence = prediction.confidence,
        "identifying coin from prediction"
    );

    let (web_results, error) = run_search(aggregator, &query, max_results).await?;
    Ok(IdentifyReport {
        ai_prediction: prediction,
        database_results: Vec::new(),
        web_results,
        error,
    })
}

/// Search the web for free text and assemble the report.
///
/// # Errors
///
/// Same as [`identify`].
pub async fn search_text(
    aggregator: &SearchAggregator,
    text: &str,
    max_results: usize,
) -> Result<SearchReport> {
    let query = web_query_for_text(text)?;
    let (web_results, error) = run_search(aggregator, &query, max_results).await?;
    Ok(SearchReport {
        database_results: Vec::new(),
        web_results,
        error,
    })
}

/// Run one search, absorbing everything but configuration errors.
async fn run_search(
    aggregator: &SearchAggregator,
    query: &str,
    max_results: usize,
) -> Result<(Vec<SearchResult>, Option<String>)> {
    tracing::trace!(query, "running web search");
    match aggregator.search(query, max_results).await {
        Ok(results) => {
            tracing::info!(count = results.len(), "web search returned results");
            Ok((results, None))
        }
        Err(SearchError::AllEnginesFailed(detail)) => {
            tracing::warn!(%detail, "no search engine answered; returning no web results");
            Ok((Vec::new(), None))
        }
        Err(err @ SearchError::Config(_)) => Err(err.into()),
        Err(err) => {
            tracing::warn!(error = %err, "web search failed");
            Ok((Vec::new(), Some(WEB_SEARCH_FAILED.to_owned())))
        }
    }
}
