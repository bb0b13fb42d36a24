//! Issue migration error types.

use crate::content::ContentError;
use crate::destination::DestinationError;
use crate::source::SourceError;
use thiserror::Error;

/// Errors that leave an issue without a destination work item.
#[derive(Debug, Error)]
pub enum IssueError {
    /// Source issue could not be fetched.
    #[error("Failed to fetch issue: {0}")]
    Source(#[from] SourceError),

    /// Description could not be formatted.
    #[error("Failed to format description: {0}")]
    Content(#[from] ContentError),

    /// Creation request failed.
    #[error("Failed to create work item for {issue}: {source}")]
    Destination {
        issue: String,
        #[source]
        source: DestinationError,
    },

    /// Creation response did not assign an identifier.
    #[error("Migration of {issue} failed, destination response: {response}")]
    MissingIdentifier { issue: String, response: String },

    /// Transient failures persisted through every attempt.
    #[error("Giving up on {issue} after {attempts} attempts: {source}")]
    RetriesExhausted {
        issue: String,
        attempts: u32,
        #[source]
        source: Box<IssueError>,
    },
}

impl IssueError {
    /// Whether restarting the issue from the fetch may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Destination { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}
