//! Rate limit information from GitHub API responses.
//!
//! GitHub reports the caller's quota on every response through the
//! `X-RateLimit-Limit`, `X-RateLimit-Remaining` and `X-RateLimit-Reset`
//! headers. The aggregation pipeline reads the remaining counter after each
//! profile fetch and stops the run before the quota runs dry.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::DateTime;
use http::header::HeaderMap;
use serde::{Deserialize, Serialize};

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// Rate limit information extracted from GitHub API response headers.
///
/// # Example
///
/// ```
/// use roster::github::rate_limit::RateLimitInfo;
///
/// let info = RateLimitInfo::new(5000, 9, 1700000000);
/// assert!(info.is_below(10));
/// assert!(!info.is_exhausted());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    /// Maximum requests allowed in the current window.
    limit: u32,
    /// Remaining requests in the current window.
    remaining: u32,
    /// Unix timestamp when the rate limit resets.
    reset_at: u64,
}

impl RateLimitInfo {
    /// Creates a new rate limit info instance.
    #[must_use]
    pub const fn new(limit: u32, remaining: u32, reset_at: u64) -> Self {
        Self {
            limit,
            remaining,
            reset_at,
        }
    }

    /// Reads rate limit headers from a response.
    ///
    /// Only `X-RateLimit-Remaining` is mandatory; a missing limit or reset
    /// header is recorded as zero. Returns `None` when the remaining counter
    /// is absent or unparseable.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let remaining = parse_header::<u32>(headers, REMAINING_HEADER)?;
        let limit = parse_header::<u32>(headers, LIMIT_HEADER).unwrap_or(0);
        let reset_at = parse_header::<u64>(headers, RESET_HEADER).unwrap_or(0);
        Some(Self::new(limit, remaining, reset_at))
    }

    /// Returns the maximum requests allowed in the current window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the remaining requests in the current window.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Returns the Unix timestamp when the rate limit resets.
    #[must_use]
    pub const fn reset_at(&self) -> u64 {
        self.reset_at
    }

    /// Returns true if the rate limit has been exhausted.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Returns true when fewer than `threshold` calls remain.
    #[must_use]
    pub const fn is_below(&self, threshold: u32) -> bool {
        self.remaining < threshold
    }

    /// Calculates seconds until the rate limit resets.
    ///
    /// Returns 0 if the reset time has already passed or if the system time
    /// cannot be determined.
    #[must_use]
    pub fn seconds_until_reset(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs())
            .unwrap_or(0);

        self.reset_at.saturating_sub(now)
    }

    /// Formats the reset time as an RFC 3339 UTC timestamp.
    ///
    /// Falls back to the raw Unix timestamp when it is out of range.
    #[must_use]
    pub fn reset_display(&self) -> String {
        i64::try_from(self.reset_at)
            .ok()
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
            .map_or_else(|| self.reset_at.to_string(), |time| time.to_rfc3339())
    }
}

fn parse_header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse::<T>().ok()
}
