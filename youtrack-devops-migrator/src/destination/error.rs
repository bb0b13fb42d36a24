//! Destination tracker error types.

use thiserror::Error;

/// Errors that can occur while writing to the destination tracker.
#[derive(Debug, Error)]
pub enum DestinationError {
    /// HTTP client could not be constructed.
    #[error("Failed to build destination HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport-level failure.
    #[error("Destination request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("Destination returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be decoded. Observed intermittently under load.
    #[error("Failed to decode destination response ({status}): {source}")]
    Decode {
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// Attachment upload response did not carry a reference URL.
    #[error("Attachment upload response has no reference url: {body}")]
    MissingReference { body: String },

    /// Organization URL cannot hold a project path.
    #[error("Invalid destination organization URL '{url}'")]
    InvalidUrl { url: String },
}

impl DestinationError {
    /// Whether retrying the whole issue may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
