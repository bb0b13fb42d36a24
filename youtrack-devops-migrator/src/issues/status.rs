//! Issue migration outcome types.

use serde::Serialize;
use std::fmt;

/// A post-creation step of the issue migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum MigrationStep {
    /// Patching post-creation field updates.
    DeferredFields,

    /// Formatting or posting a comment.
    Comment {
        /// Zero-based position in the source comment list.
        index: usize,
    },

    /// Relocating an attachment of a comment.
    CommentAttachment {
        /// Zero-based position of the owning comment.
        comment: usize,
        /// Attachment display name.
        name: String,
    },

    /// Relocating or linking an issue-level attachment.
    Attachment {
        /// Attachment display name.
        name: String,
    },
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeferredFields => write!(f, "deferred fields"),
            Self::Comment { index } => write!(f, "comment #{}", index + 1),
            Self::CommentAttachment { comment, name } => {
                write!(f, "attachment '{name}' of comment #{}", comment + 1)
            }
            Self::Attachment { name } => write!(f, "attachment '{name}'"),
        }
    }
}

/// A post-creation step that failed without stopping the issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    /// The failed step.
    #[serde(flatten)]
    pub step: MigrationStep,
    /// Error message.
    pub error: String,
}

/// Final state of one issue at the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IssueStatus {
    /// Work item created and every step succeeded.
    Migrated {
        /// Destination work item identifier.
        work_item_id: u64,
    },

    /// Work item created but some steps failed. Not rolled back.
    Incomplete {
        /// Destination work item identifier.
        work_item_id: u64,
        /// Failed steps in execution order.
        failures: Vec<StepFailure>,
    },

    /// No work item exists for the issue.
    NotCreated {
        /// Error message.
        error: String,
    },
}

impl IssueStatus {
    /// Destination identifier, if the work item exists.
    #[must_use]
    pub fn work_item_id(&self) -> Option<u64> {
        match self {
            Self::Migrated { work_item_id } | Self::Incomplete { work_item_id, .. } => {
                Some(*work_item_id)
            }
            Self::NotCreated { .. } => None,
        }
    }
}

/// Result of a migration attempt that created a work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratedIssue {
    /// Source issue identifier.
    pub source_id: String,
    /// Destination work item identifier.
    pub work_item_id: u64,
    /// Post-creation steps that failed.
    pub failures: Vec<StepFailure>,
}

impl MigratedIssue {
    /// Whether every post-creation step succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Converts the result into a status.
    #[must_use]
    pub fn into_status(self) -> IssueStatus {
        if self.failures.is_empty() {
            IssueStatus::Migrated {
                work_item_id: self.work_item_id,
            }
        } else {
            IssueStatus::Incomplete {
                work_item_id: self.work_item_id,
                failures: self.failures,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_when_any_step_failed() {
        let migrated = MigratedIssue {
            source_id: "DEMO-1".to_string(),
            work_item_id: 7,
            failures: vec![StepFailure {
                step: MigrationStep::Attachment {
                    name: "x.png".to_string(),
                },
                error: "404".to_string(),
            }],
        };
        assert!(!migrated.is_complete());

        let status = migrated.into_status();
        assert!(matches!(status, IssueStatus::Incomplete { work_item_id: 7, .. }));
        assert_eq!(status.work_item_id(), Some(7));
    }

    #[test]
    fn serializes_status_with_tag() {
        let status = IssueStatus::Migrated { work_item_id: 3 };
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            serde_json::json!({"status": "migrated", "work_item_id": 3})
        );
    }

    #[test]
    fn describes_steps_one_based() {
        assert_eq!(MigrationStep::Comment { index: 0 }.to_string(), "comment #1");
    }
}
