//! Per-issue report.

use crate::issues::IssueStatus;
use serde::Serialize;

/// Outcome of migrating a single issue, retries included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueReport {
    /// Source issue identifier.
    pub issue_id: String,

    /// Attempts made, counting the first.
    pub attempts: u32,

    /// Final state at the destination.
    #[serde(flatten)]
    pub status: IssueStatus,
}

impl IssueReport {
    /// Creates a report.
    #[must_use]
    pub fn new(issue_id: impl Into<String>, attempts: u32, status: IssueStatus) -> Self {
        Self {
            issue_id: issue_id.into(),
            attempts,
            status,
        }
    }

    /// Whether the issue has no destination work item.
    #[must_use]
    pub fn is_not_created(&self) -> bool {
        matches!(self.status, IssueStatus::NotCreated { .. })
    }
}
