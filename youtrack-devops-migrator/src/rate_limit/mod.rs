//! Rate limiting utilities for the Azure DevOps API.
//!
//! This module reads the destination's throttling headers and waits when the
//! remaining budget runs low, respecting the Retry-After header.

mod info;

pub use info::RateLimitInfo;

use info::header_number;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{info, warn};

/// Maximum time to wait for rate limit reset (1 hour).
const MAX_WAIT_SECS: u64 = 3600;

/// Minimum remaining budget before proactively waiting.
const MIN_REMAINING_THRESHOLD: u32 = 5;

/// Waits if the rate limit is low, returning true if we waited.
///
/// This function proactively waits when the remaining budget falls below
/// `MIN_REMAINING_THRESHOLD` to avoid being throttled.
pub async fn wait_if_needed(info: &RateLimitInfo) -> bool {
    if info.remaining >= MIN_REMAINING_THRESHOLD {
        return false;
    }

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    if info.reset <= now {
        return false;
    }

    let wait_secs = info.reset - now;
    if wait_secs > MAX_WAIT_SECS {
        warn!(
            wait_secs,
            max_wait = MAX_WAIT_SECS,
            "Rate limit reset too far in future, capping wait time"
        );
    }

    let actual_wait = wait_secs.min(MAX_WAIT_SECS);
    info!(
        remaining = info.remaining,
        wait_secs = actual_wait,
        "Rate limit low, waiting for reset"
    );

    tokio::time::sleep(Duration::from_secs(actual_wait)).await;
    true
}

/// Waits for the duration requested by a Retry-After header.
pub async fn wait_for_retry_after(retry_after_secs: u64) {
    let actual_wait = retry_after_secs.min(MAX_WAIT_SECS);
    info!(
        retry_after = retry_after_secs,
        actual_wait, "Received Retry-After header, waiting"
    );
    tokio::time::sleep(Duration::from_secs(actual_wait)).await;
}

/// Returns the Retry-After delay of a throttled (429/503) response.
#[must_use]
pub fn throttled_retry_after(status: StatusCode, headers: &HeaderMap) -> Option<u64> {
    if status != StatusCode::TOO_MANY_REQUESTS && status != StatusCode::SERVICE_UNAVAILABLE {
        return None;
    }
    header_number(headers, RETRY_AFTER.as_str())
}
