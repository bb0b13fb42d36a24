#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod attachments;
pub mod config;
pub mod content;
pub mod destination;
pub mod issues;
pub mod mapping;
pub mod rate_limit;
pub mod runner;
pub mod source;
pub mod summary;

#[cfg(test)]
pub(crate) mod test_support;

pub use attachments::{AttachmentError, AttachmentRelocator};
pub use config::{ConfigError, FailurePolicy, MigratorConfig};
pub use content::{ContentError, ContentFormatter, Provenance};
pub use destination::{DestinationError, DestinationTracker, DevOpsClient, PatchOperation};
pub use issues::{IssueError, IssueMigrator, IssueStatus, MigratedIssue, StepFailure};
pub use mapping::{
    map_fields, policy_fn, FieldDirective, FieldPlan, FieldRule, FieldUpdate, MappingPolicy,
    NoCustomFields, Phase, RuleBasedPolicy,
};
pub use rate_limit::RateLimitInfo;
pub use runner::{Progress, ProgressEvent, ProjectMigrator, RetryPolicy, RunnerError};
pub use source::{CustomFields, FieldValue, SourceError, SourceIssue, SourceTracker, YouTrackClient};
pub use summary::{IssueReport, RunSummary};
