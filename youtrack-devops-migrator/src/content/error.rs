//! Content formatting error types.

/// Content formatting error.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Handlebars rendering error.
    #[error("Template rendering error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    /// Template registration error.
    #[error("Template registration error: {0}")]
    RegistrationError(#[from] handlebars::TemplateError),

    /// Timestamp cannot be represented as a calendar date.
    #[error("Timestamp {0} ms is out of range")]
    TimestampOutOfRange(i64),
}
