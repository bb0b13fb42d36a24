//! Per-issue migration.
//!
//! Each issue goes through a fixed sequence: fetch, build the creation
//! payload, create the work item, patch deferred fields, post comments in
//! source order, then attach issue-level files in source order. Only the
//! first three steps can fail the issue; later failures are recorded and the
//! work item is left as-is, since the destination has no transactions.

mod error;
mod status;

pub use error::IssueError;
pub use status::{IssueStatus, MigratedIssue, MigrationStep, StepFailure};

use crate::attachments::AttachmentRelocator;
use crate::content::{ContentFormatter, Provenance};
use crate::destination::{DestinationTracker, PatchOperation};
use crate::mapping::{FieldPlan, MappingPolicy};
use crate::source::{Comment, SourceIssue, SourceTracker};
use serde_json::Value;
use std::fmt::Display;
use tracing::{debug, info, info_span, warn, Instrument};

/// Destination field holding the work item title.
pub const TITLE_FIELD: &str = "System.Title";

/// Destination field holding the work item description.
pub const DESCRIPTION_FIELD: &str = "System.Description";

/// Migrates single issues between two trackers.
pub struct IssueMigrator<'a> {
    source: &'a dyn SourceTracker,
    destination: &'a dyn DestinationTracker,
    policy: &'a dyn MappingPolicy,
    formatter: &'a ContentFormatter,
}

impl<'a> IssueMigrator<'a> {
    /// Creates a migrator over the given collaborators.
    pub fn new(
        source: &'a dyn SourceTracker,
        destination: &'a dyn DestinationTracker,
        policy: &'a dyn MappingPolicy,
        formatter: &'a ContentFormatter,
    ) -> Self {
        Self {
            source,
            destination,
            policy,
            formatter,
        }
    }

    /// Migrates one issue from a fresh fetch.
    ///
    /// # Errors
    ///
    /// Returns [`IssueError`] if no work item was created. Failures after
    /// creation are reported in [`MigratedIssue::failures`] instead.
    pub async fn migrate(&self, issue_id: &str) -> Result<MigratedIssue, IssueError> {
        let span = info_span!("migrate_issue", issue = %issue_id);

        async {
            let issue = self.source.fetch_issue(issue_id).await?;
            debug!(
                comments = issue.comments.len(),
                attachments = issue.attachments.len(),
                "Fetched issue"
            );

            let plan = FieldPlan::build(&issue.custom_fields, self.policy);
            let operations = self.creation_operations(&issue, &plan)?;
            let work_item_id = self.create(&issue.id, &operations).await?;
            info!(work_item_id, "Work item created");

            let mut failures = Vec::new();
            self.patch_deferred(work_item_id, &plan, &mut failures).await;
            for (index, comment) in issue.comments.iter().enumerate() {
                self.migrate_comment(&issue, work_item_id, index, comment, &mut failures)
                    .await;
            }
            self.migrate_attachments(&issue, work_item_id, &mut failures)
                .await;

            if failures.is_empty() {
                info!(work_item_id, "Issue migrated");
            } else {
                warn!(
                    work_item_id,
                    failed_steps = failures.len(),
                    "Issue migrated incompletely"
                );
            }

            Ok(MigratedIssue {
                source_id: issue.id,
                work_item_id,
                failures,
            })
        }
        .instrument(span)
        .await
    }

    fn creation_operations(
        &self,
        issue: &SourceIssue,
        plan: &FieldPlan,
    ) -> Result<Vec<PatchOperation>, IssueError> {
        let description = self.formatter.format_description(
            self.source.base_url(),
            &issue.id,
            issue.description.as_deref().unwrap_or_default(),
            Provenance {
                author: issue.reporter_login(),
                created: issue.created,
            },
        )?;

        let mut operations = vec![
            PatchOperation::set_field(TITLE_FIELD, issue.summary.as_str()),
            PatchOperation::set_field(DESCRIPTION_FIELD, description),
        ];
        operations.extend(plan.create.iter().cloned().map(PatchOperation::from));
        Ok(operations)
    }

    async fn create(&self, issue_id: &str, operations: &[PatchOperation]) -> Result<u64, IssueError> {
        let response = self
            .destination
            .create_work_item(operations)
            .await
            .map_err(|source| IssueError::Destination {
                issue: issue_id.to_string(),
                source,
            })?;

        work_item_id(&response).ok_or_else(|| IssueError::MissingIdentifier {
            issue: issue_id.to_string(),
            response: response.to_string(),
        })
    }

    async fn patch_deferred(
        &self,
        work_item_id: u64,
        plan: &FieldPlan,
        failures: &mut Vec<StepFailure>,
    ) {
        if plan.deferred.is_empty() {
            return;
        }
        let operations: Vec<PatchOperation> =
            plan.deferred.iter().cloned().map(PatchOperation::from).collect();

        if let Err(e) = self
            .destination
            .update_work_item(work_item_id, &operations)
            .await
        {
            record(failures, MigrationStep::DeferredFields, e);
        }
    }

    async fn migrate_comment(
        &self,
        issue: &SourceIssue,
        work_item_id: u64,
        index: usize,
        comment: &Comment,
        failures: &mut Vec<StepFailure>,
    ) {
        let formatted = self.formatter.format_comment(
            self.source.base_url(),
            &issue.id,
            comment.text.as_deref().unwrap_or_default(),
            Provenance {
                author: comment.author_login(),
                created: comment.created,
            },
        );
        let mut text = match formatted {
            Ok(text) => text,
            Err(e) => {
                record(failures, MigrationStep::Comment { index }, e);
                return;
            }
        };

        let relocator = AttachmentRelocator::new(self.source, self.destination);
        for attachment in &comment.attachments {
            match relocator.relocate(attachment).await {
                Ok(url) => {
                    text = self
                        .formatter
                        .append_attachment_link(&text, &attachment.name, &url);
                }
                Err(e) => record(
                    failures,
                    MigrationStep::CommentAttachment {
                        comment: index,
                        name: attachment.name.clone(),
                    },
                    e,
                ),
            }
        }

        if let Err(e) = self.destination.add_comment(work_item_id, &text).await {
            record(failures, MigrationStep::Comment { index }, e);
        }
    }

    async fn migrate_attachments(
        &self,
        issue: &SourceIssue,
        work_item_id: u64,
        failures: &mut Vec<StepFailure>,
    ) {
        let relocator = AttachmentRelocator::new(self.source, self.destination);
        for attachment in &issue.attachments {
            let step = MigrationStep::Attachment {
                name: attachment.name.clone(),
            };
            let url = match relocator.relocate(attachment).await {
                Ok(url) => url,
                Err(e) => {
                    record(failures, step, e);
                    continue;
                }
            };

            let link = [PatchOperation::attach_file(&url, &attachment.name)];
            if let Err(e) = self.destination.update_work_item(work_item_id, &link).await {
                record(failures, step, e);
            }
        }
    }
}

/// Extracts the assigned identifier from a creation response.
fn work_item_id(response: &Value) -> Option<u64> {
    response.get("id").and_then(Value::as_u64)
}

fn record(failures: &mut Vec<StepFailure>, step: MigrationStep, error: impl Display) {
    warn!(%step, error = %error, "Step failed, continuing");
    failures.push(StepFailure {
        step,
        error: error.to_string(),
    });
}
