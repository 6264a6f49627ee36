//! coinlens: Indian coin identification with verified web context.
//!
//! A classifier label (or free text) becomes a `"<label> coin numismatics"`
//! web query. The [`coin_search`] crate queries Google and DuckDuckGo,
//! fetches every candidate page and keeps only pages that read as coin
//! content. The result is a JSON-serialisable report.

pub mod config;
pub mod error;
pub mod identify;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use identify::{identify, search_text, IdentifyReport, Prediction, SearchReport};
