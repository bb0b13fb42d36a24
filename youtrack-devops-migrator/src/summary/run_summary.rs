//! Run summary types.

use super::report::IssueReport;
use crate::issues::IssueStatus;
use serde::Serialize;

/// Summary of a complete run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Source project, empty for single-issue runs.
    pub project: String,

    /// Number of issue identifiers returned by the listing query.
    pub issues_discovered: usize,

    /// Number of issues fully migrated.
    pub issues_migrated: usize,

    /// Number of work items created with failed steps.
    pub issues_incomplete: usize,

    /// Number of issues without a work item.
    pub issues_not_created: usize,

    /// Retries spent across all issues.
    pub retries: u32,

    /// Issue whose failure stopped the run, if any.
    pub aborted_at: Option<String>,

    /// One report per processed issue, in processing order.
    pub reports: Vec<IssueReport>,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..Default::default()
        }
    }

    /// Updates the summary with an issue report.
    pub fn record(&mut self, report: IssueReport) {
        match report.status {
            IssueStatus::Migrated { .. } => self.issues_migrated += 1,
            IssueStatus::Incomplete { .. } => self.issues_incomplete += 1,
            IssueStatus::NotCreated { .. } => self.issues_not_created += 1,
        }
        self.retries += report.attempts.saturating_sub(1);
        self.reports.push(report);
    }

    /// Number of issues processed so far.
    #[must_use]
    pub fn issues_processed(&self) -> usize {
        self.reports.len()
    }

    /// Returns true if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.issues_incomplete > 0 || self.issues_not_created > 0 || self.aborted_at.is_some()
    }

    /// Returns true if all operations were successful.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }
}
