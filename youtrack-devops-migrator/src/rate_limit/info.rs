//! Rate limit information.

use reqwest::header::HeaderMap;

/// Azure DevOps throttling headers.
pub(crate) const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub(crate) const RESET_HEADER: &str = "x-ratelimit-reset";
pub(crate) const LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Rate limit information reported by the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests (or throughput units) remaining in the current window.
    pub remaining: u32,

    /// Unix timestamp when the rate limit resets.
    pub reset: u64,

    /// Total allowed per window, when reported.
    pub limit: Option<u32>,
}

impl RateLimitInfo {
    /// Reads throttling headers from a response.
    ///
    /// Returns `None` unless both the remaining budget and reset time are present.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        Some(Self {
            remaining: header_number(headers, REMAINING_HEADER)?,
            reset: header_number(headers, RESET_HEADER)?,
            limit: header_number(headers, LIMIT_HEADER),
        })
    }
}

pub(crate) fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
