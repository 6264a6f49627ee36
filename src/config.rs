//! Configuration types for coinlens.
//!
//! Loaded from TOML. Every field has a default, so a partial (or empty)
//! file is valid.

use std::path::{Path, PathBuf};

use coin_search::SearchConfig;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Web search settings.
    pub search: SearchSettings,
}

/// The `[search]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Results returned per query.
    pub max_results: usize,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Pause after each successful page fetch, in milliseconds.
    pub politeness_delay_ms: u64,
    /// Distinct coin keywords a page needs to count as relevant.
    pub min_keyword_matches: usize,
    /// Candidate pages fetched at once.
    pub max_concurrent_fetches: usize,
    /// Per-host request budget. `0` disables throttling.
    pub per_host_requests_per_minute: u32,
    /// Deadline for a whole search, in seconds.
    pub search_timeout_seconds: Option<u64>,
    /// Verified result cache lifetime. `0` disables caching.
    pub cache_ttl_seconds: u64,
    /// Ask engines for safe search.
    pub safe_search: bool,
    /// JSON file of browser header profiles. Built-in profiles when unset.
    pub headers_path: Option<PathBuf>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            max_results: config.max_results,
            timeout_seconds: config.timeout_seconds,
            politeness_delay_ms: config.politeness_delay_ms,
            min_keyword_matches: config.min_keyword_matches,
            max_concurrent_fetches: config.max_concurrent_fetches,
            per_host_requests_per_minute: config.per_host_requests_per_minute,
            search_timeout_seconds: config.search_timeout_seconds,
            cache_ttl_seconds: config.cache_ttl_seconds,
            safe_search: config.safe_search,
            headers_path: config.headers_path.clone(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/coinlens/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("coinlens").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("coinlens")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/coinlens-config/config.toml")
        }
    }

    /// Build a validated [`SearchConfig`] from the `[search]` table.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if a setting is out of range.
    pub fn to_search_config(&self) -> Result<SearchConfig> {
        let s = &self.search;
        let config = SearchConfig {
            max_results: s.max_results,
            timeout_seconds: s.timeout_seconds,
            politeness_delay_ms: s.politeness_delay_ms,
            min_keyword_matches: s.min_keyword_matches,
            max_concurrent_fetches: s.max_concurrent_fetches,
            per_host_requests_per_minute: s.per_host_requests_per_minute,
            search_timeout_seconds: s.search_timeout_seconds,
            cache_ttl_seconds: s.cache_ttl_seconds,
            safe_search: s.safe_search,
            headers_path: s.headers_path.clone(),
        };
        config
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        Ok(config)
    }
}
