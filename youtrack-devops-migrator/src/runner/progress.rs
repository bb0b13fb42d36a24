//! Per-issue progress reporting.

use crate::issues::{IssueError, IssueStatus};

/// What happened to an issue attempt.
#[derive(Debug)]
pub enum ProgressEvent<'a> {
    /// An attempt is about to start.
    Started,
    /// An attempt finished with a terminal status.
    Finished(&'a IssueStatus),
    /// An attempt failed and will be retried.
    Retrying(&'a IssueError),
}

/// Progress of one issue attempt within a run.
#[derive(Debug)]
pub struct Progress<'a> {
    /// One-based position of the issue in the run.
    pub index: usize,
    /// Number of issues in the run.
    pub total: usize,
    /// Source issue identifier.
    pub issue_id: &'a str,
    /// One-based attempt number.
    pub attempt: u32,
    /// What happened.
    pub event: ProgressEvent<'a>,
}

/// Callback receiving progress before and after each issue attempt.
pub type ProgressCallback = Box<dyn Fn(&Progress<'_>) + Send + Sync>;
