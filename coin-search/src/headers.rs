//! Browser-like request header profiles, rotated per outbound request.
//!
//! Profiles come from a JSON array of header-name → value objects, either
//! a user-supplied file or the set compiled into this crate. The pool is
//! loaded once and read-only afterwards; a missing, malformed or empty
//! resource is a [`SearchError::Config`].

use std::collections::BTreeMap;
use std::path::Path;

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};

const BUILTIN_PROFILES: &str = include_str!("../data/headers.json");

/// One captured set of browser request headers.
#[derive(Debug, Clone)]
pub struct HeaderProfile {
    entries: BTreeMap<String, String>,
    headers: HeaderMap,
}

impl HeaderProfile {
    fn from_entries(index: usize, entries: BTreeMap<String, String>) -> Result<Self> {
        let mut headers = HeaderMap::with_capacity(entries.len());
        for (name, value) in &entries {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                SearchError::Config(format!("profile {index}: invalid header name {name:?}: {e}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                SearchError::Config(format!("profile {index}: invalid value for {name}: {e}"))
            })?;
            headers.insert(header_name, header_value);
        }
        Ok(Self { entries, headers })
    }

    /// Header value by name, case-insensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Raw header entries as they appear in the resource.
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    /// Headers ready to attach to a [`reqwest::RequestBuilder`].
    pub fn header_map(&self) -> HeaderMap {
        self.headers.clone()
    }
}

/// Immutable pool of header profiles.
#[derive(Debug, Clone)]
pub struct HeaderPool {
    profiles: Vec<HeaderProfile>,
}

impl HeaderPool {
    /// Load the pool named by `config.headers_path`, or the built-in set.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the resource is missing or malformed.
    pub fn load(config: &SearchConfig) -> Result<Self> {
        match config.headers_path {
            Some(ref path) => Self::from_path(path),
            None => Self::builtin(),
        }
    }

    /// The profiles compiled into this crate.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] only if the embedded resource is broken.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_PROFILES)
    }

    /// Read profiles from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SearchError::Config(format!(
                "cannot read header profiles from {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&raw)
    }

    /// Parse profiles from a JSON array of string → string objects.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for invalid JSON, a non-array or
    /// non-object structure, invalid header names or values, or an empty list.
    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: Vec<BTreeMap<String, String>> = serde_json::from_str(raw)
            .map_err(|e| SearchError::Config(format!("malformed header profiles: {e}")))?;

        if parsed.is_empty() {
            return Err(SearchError::Config("header profile list is empty".into()));
        }

        let profiles = parsed
            .into_iter()
            .enumerate()
            .map(|(index, entries)| HeaderProfile::from_entries(index, entries))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(count = profiles.len(), "header profiles loaded");
        Ok(Self { profiles })
    }

    /// Pick a profile uniformly at random, with replacement.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &HeaderProfile {
        // Construction guarantees at least one profile.
        let index = rng.gen_range(0..self.profiles.len());
        &self.profiles[index]
    }

    /// Number of profiles in the pool.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the pool has no profiles.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
