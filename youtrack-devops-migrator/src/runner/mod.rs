//! Orchestrates project migrations.
//!
//! Issues are enumerated once, then migrated strictly one after another.
//! A transient destination failure restarts the issue from the fetch after a
//! back-off delay. A retried issue whose earlier attempt already created a
//! work item is created again; there is no resume.

mod error;
mod progress;
mod retry;

pub use error::RunnerError;
pub use progress::{Progress, ProgressCallback, ProgressEvent};
pub use retry::RetryPolicy;

use crate::config::{FailurePolicy, MigratorConfig};
use crate::content::ContentFormatter;
use crate::destination::DestinationTracker;
use crate::issues::{IssueError, IssueMigrator, IssueStatus};
use crate::mapping::MappingPolicy;
use crate::source::SourceTracker;
use crate::summary::{IssueReport, RunSummary};
use tracing::{error, info, info_span, warn, Instrument};

/// Migrates issues from a source project into the destination.
pub struct ProjectMigrator<'a> {
    source: &'a dyn SourceTracker,
    destination: &'a dyn DestinationTracker,
    policy: &'a dyn MappingPolicy,
    formatter: ContentFormatter,
    retry: RetryPolicy,
    on_failure: FailurePolicy,
    progress: Option<ProgressCallback>,
}

impl<'a> ProjectMigrator<'a> {
    /// Builds a migrator from the run configuration and its collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Content`] if the provenance templates are invalid.
    pub fn new(
        config: &MigratorConfig,
        source: &'a dyn SourceTracker,
        destination: &'a dyn DestinationTracker,
        policy: &'a dyn MappingPolicy,
    ) -> Result<Self, RunnerError> {
        Ok(Self {
            source,
            destination,
            policy,
            formatter: ContentFormatter::new(config.content())?,
            retry: RetryPolicy::from(config.retry()),
            on_failure: config.run().on_failure,
            progress: None,
        })
    }

    /// Overrides the retry schedule.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Registers a callback invoked before and after every issue attempt.
    #[must_use]
    pub fn with_progress(mut self, callback: impl Fn(&Progress<'_>) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Returns the policy applied when an issue cannot be created.
    pub fn failure_policy(&self) -> FailurePolicy {
        self.on_failure
    }

    /// Migrates up to `limit` issues of `project`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Listing`] if the issues cannot be enumerated.
    /// Per-issue failures are reported in the summary instead.
    pub async fn run(&self, project: &str, limit: usize) -> Result<RunSummary, RunnerError> {
        let span = info_span!("migrate_project", project = %project);

        async {
            let mut summary = RunSummary::new(project);
            info!(limit, "Listing issues");
            let ids = self
                .source
                .list_issue_ids(project, limit)
                .await
                .map_err(|source| RunnerError::Listing {
                    project: project.to_string(),
                    source,
                })?;

            if ids.is_empty() {
                warn!("No issues found");
                return Ok(summary);
            }

            info!(count = ids.len(), "Found issues");
            summary.issues_discovered = ids.len();

            for (index, id) in ids.iter().enumerate() {
                let report = self.migrate_with_retry(index + 1, ids.len(), id).await;
                let failed = report.is_not_created();
                summary.record(report);

                if failed && self.on_failure == FailurePolicy::Abort {
                    error!(issue = %id, "Aborting run");
                    summary.aborted_at = Some(id.clone());
                    break;
                }
            }

            info!(
                migrated = summary.issues_migrated,
                incomplete = summary.issues_incomplete,
                not_created = summary.issues_not_created,
                "Project migration finished"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    /// Migrates a single issue with the same retry behaviour as [`Self::run`].
    pub async fn migrate_issue(&self, issue_id: &str) -> IssueReport {
        self.migrate_with_retry(1, 1, issue_id).await
    }

    async fn migrate_with_retry(&self, index: usize, total: usize, issue_id: &str) -> IssueReport {
        let migrator = IssueMigrator::new(self.source, self.destination, self.policy, &self.formatter);
        let mut attempt = 1;

        loop {
            info!(index, total, issue = %issue_id, attempt, "Migrating issue");
            self.notify(index, total, issue_id, attempt, ProgressEvent::Started);

            let error = match migrator.migrate(issue_id).await {
                Ok(migrated) => {
                    let status = migrated.into_status();
                    self.notify(index, total, issue_id, attempt, ProgressEvent::Finished(&status));
                    return IssueReport::new(issue_id, attempt, status);
                }
                Err(e) => e,
            };

            if error.is_transient() && attempt < self.retry.max_attempts() {
                let delay = self.retry.delay_after(attempt);
                warn!(
                    issue = %issue_id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Transient failure, restarting issue"
                );
                self.notify(index, total, issue_id, attempt, ProgressEvent::Retrying(&error));
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            let error = if error.is_transient() {
                IssueError::RetriesExhausted {
                    issue: issue_id.to_string(),
                    attempts: attempt,
                    source: Box::new(error),
                }
            } else {
                error
            };
            error!(issue = %issue_id, attempt, error = %error, "Issue not migrated");

            let status = IssueStatus::NotCreated {
                error: error.to_string(),
            };
            self.notify(index, total, issue_id, attempt, ProgressEvent::Finished(&status));
            return IssueReport::new(issue_id, attempt, status);
        }
    }

    fn notify(&self, index: usize, total: usize, issue_id: &str, attempt: u32, event: ProgressEvent<'_>) {
        if let Some(callback) = &self.progress {
            callback(&Progress {
                index,
                total,
                issue_id,
                attempt,
                event,
            });
        }
    }
}
