//! Attachment relocation from the source tracker to the destination.
//!
//! Bytes are either decoded from inline content or downloaded from the
//! source, then uploaded to the destination. Content is held fully in
//! memory between the two steps; there is no streaming.

mod error;

pub use error::AttachmentError;

use crate::destination::DestinationTracker;
use crate::source::{Attachment, ContentLocator, SourceTracker};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;
use url::Url;

/// Moves attachment content into the destination tracker.
pub struct AttachmentRelocator<'a> {
    source: &'a dyn SourceTracker,
    destination: &'a dyn DestinationTracker,
}

impl<'a> AttachmentRelocator<'a> {
    /// Creates a relocator over the given trackers.
    pub fn new(source: &'a dyn SourceTracker, destination: &'a dyn DestinationTracker) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Uploads `attachment` to the destination and returns its reference URL.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError`] if the content cannot be obtained, the
    /// upload fails, or the upload response carries no reference.
    pub async fn relocate(&self, attachment: &Attachment) -> Result<String, AttachmentError> {
        let content = self.content(attachment).await?;
        debug!(name = %attachment.name, bytes = content.len(), "Uploading attachment");
        Ok(self
            .destination
            .upload_attachment(&attachment.name, content)
            .await?)
    }

    async fn content(&self, attachment: &Attachment) -> Result<Vec<u8>, AttachmentError> {
        match attachment.locator() {
            Some(ContentLocator::Inline(data)) => decode_inline(&attachment.name, data),
            Some(ContentLocator::Remote(locator)) => {
                let url = resolve_locator(self.source.base_url(), locator)?;
                Ok(self.source.download(&url).await?)
            }
            None => Err(AttachmentError::MissingLocator {
                name: attachment.name.clone(),
            }),
        }
    }
}

/// Resolves a possibly relative locator against the source base URL.
///
/// Relative locators are appended to the base as-is, so a base with a
/// context path (`https://host/youtrack`) keeps it.
///
/// # Errors
///
/// Returns [`AttachmentError::InvalidUrl`] if the result is not a valid URL.
pub fn resolve_locator(base: &Url, locator: &str) -> Result<Url, AttachmentError> {
    let absolute = match Url::parse(locator) {
        Ok(url) => return Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let separator = if locator.starts_with('/') { "" } else { "/" };
            format!(
                "{}{separator}{locator}",
                base.as_str().trim_end_matches('/')
            )
        }
        Err(source) => {
            return Err(AttachmentError::InvalidUrl {
                url: locator.to_string(),
                source,
            })
        }
    };

    Url::parse(&absolute).map_err(|source| AttachmentError::InvalidUrl {
        url: absolute.clone(),
        source,
    })
}

/// Decodes inline content of attachment `name`, accepting either a `data:`
/// URI or bare base64.
///
/// # Errors
///
/// Returns [`AttachmentError::MalformedDataUri`] if a `data:` URI has no
/// comma, or [`AttachmentError::Decode`] if the payload is not valid base64.
pub fn decode_inline(name: &str, data: &str) -> Result<Vec<u8>, AttachmentError> {
    let payload = match data.strip_prefix("data:") {
        Some(uri) => match uri.split_once(',') {
            Some((_, payload)) => payload,
            None => {
                return Err(AttachmentError::MalformedDataUri {
                    name: name.to_string(),
                })
            }
        },
        None => data,
    };
    STANDARD
        .decode(payload.trim())
        .map_err(|source| AttachmentError::Decode {
            name: name.to_string(),
            source,
        })
}
