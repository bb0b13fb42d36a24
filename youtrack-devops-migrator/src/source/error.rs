//! Source tracker error types.

use thiserror::Error;

/// Errors that can occur while reading from the source tracker.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP client could not be constructed.
    #[error("Failed to build source HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport-level failure.
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status.
    #[error("Source tracker returned {status} for {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// Response body was not the expected JSON shape.
    #[error("Failed to decode source response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// URL could not be built from the configured base.
    #[error("Invalid source URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
