//! Runner error types.

/// Errors that stop a migration run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading or validation errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Provenance templates could not be registered.
    #[error(transparent)]
    Content(#[from] crate::content::ContentError),

    /// Source client initialization or single-issue fetch errors.
    #[error(transparent)]
    Source(#[from] crate::source::SourceError),

    /// Destination client initialization errors.
    #[error(transparent)]
    Destination(#[from] crate::destination::DestinationError),

    /// Issue enumeration failed.
    #[error("Failed to list issues of project {project}: {source}")]
    Listing {
        project: String,
        #[source]
        source: crate::source::SourceError,
    },
}
