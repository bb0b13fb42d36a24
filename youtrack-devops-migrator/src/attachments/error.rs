//! Attachment relocation error types.

use crate::destination::DestinationError;
use crate::source::SourceError;
use thiserror::Error;

/// Errors that can occur while moving one attachment.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// Attachment has neither a URL nor inline content.
    #[error("Attachment '{name}' has no content locator")]
    MissingLocator { name: String },

    /// Locator could not be resolved to an absolute URL.
    #[error("Invalid attachment URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Inline `data:` URI has no payload separator.
    #[error("Inline attachment '{name}' is a data URI without a payload")]
    MalformedDataUri { name: String },

    /// Inline content is not valid base64.
    #[error("Failed to decode inline attachment '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: base64::DecodeError,
    },

    /// Download from the source tracker failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Upload to the destination tracker failed.
    #[error(transparent)]
    Destination(#[from] DestinationError),
}
