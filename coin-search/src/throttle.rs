//! Per-host request throttling for concurrent page fetches.
//!
//! The politeness delay only spaces out requests made by one worker. With
//! several workers in flight, the keyed limiter here caps how often any
//! single host is hit.

use std::num::NonZeroU32;

use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use url::Url;

type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Token bucket per host name.
pub struct HostThrottle {
    limiter: KeyedLimiter,
    requests_per_minute: u32,
}

impl HostThrottle {
    /// Create a throttle allowing `requests_per_minute` per host.
    ///
    /// Returns `None` when `requests_per_minute` is zero (throttling off).
    pub fn new(requests_per_minute: u32) -> Option<Self> {
        let rpm = NonZeroU32::new(requests_per_minute)?;
        Some(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(rpm)),
            requests_per_minute,
        })
    }

    /// Wait until a request to the host of `url` is allowed.
    ///
    /// URLs without a host are not throttled.
    pub async fn wait_for(&self, url: &str) {
        let Some(host) = host_key(url) else {
            return;
        };
        self.limiter.until_key_ready(&host).await;
    }

    /// Configured per-host budget.
    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }
}

impl std::fmt::Debug for HostThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostThrottle")
            .field("requests_per_minute", &self.requests_per_minute)
            .finish()
    }
}

/// Lowercased host of `url`, if it parses and has one.
fn host_key(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str().map(str::to_lowercase)
}
