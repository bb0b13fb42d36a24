//! Deserialized sections of `migrator.toml`.

use serde::Deserialize;
use url::Url;

/// Environment variable consulted when `[source] token` is unset.
pub const SOURCE_TOKEN_ENV: &str = "YOUTRACK_TOKEN";

/// Environment variable consulted when `[destination] token` is unset.
pub const DESTINATION_TOKEN_ENV: &str = "AZURE_DEVOPS_TOKEN";

/// `[source]`: the YouTrack instance issues are read from.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SourceSettings {
    /// Base URL of the YouTrack instance, e.g. `https://youtrack.example.com`.
    pub base_url: Url,

    /// Permanent token. Requests are unauthenticated when absent.
    #[serde(default)]
    pub token: Option<String>,

    /// Skip TLS certificate verification for self-hosted instances.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

/// `[destination]`: the Azure DevOps project work items are created in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DestinationSettings {
    /// Organization URL, e.g. `https://dev.azure.com/acme`.
    pub organization: Url,

    /// Project name within the organization.
    pub project: String,

    /// Work item type created for each issue.
    #[serde(default = "default_work_item_type")]
    pub work_item_type: String,

    /// REST API version.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Personal access token.
    #[serde(default)]
    pub token: Option<String>,
}

/// What happens to the run when one issue fails terminally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop the run and report the failing issue.
    #[default]
    Abort,
    /// Record the failure and move on to the next issue.
    Continue,
}

/// `[run]`: which issues to migrate and how to treat failures.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RunSettings {
    /// Source project short name or ID.
    #[serde(default)]
    pub project: Option<String>,

    /// Upper bound on enumerated issues.
    #[serde(default = "default_issue_limit")]
    pub issue_limit: usize,

    /// Policy for terminal per-issue failures.
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            project: None,
            issue_limit: default_issue_limit(),
            on_failure: FailurePolicy::default(),
        }
    }
}

/// `[retry]`: back-off applied when the destination returns an undecodable response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RetrySettings {
    /// Total attempts per issue, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Upper bound on any single delay.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Growth factor between consecutive delays.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
        }
    }
}

/// `[content]`: provenance templates and markup conventions.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ContentSettings {
    /// Destination line-break token substituted for `\n`.
    #[serde(default = "default_line_break")]
    pub line_break: String,

    /// Handlebars template for the description preamble.
    #[serde(default = "default_description_preamble")]
    pub description_preamble: String,

    /// Handlebars template for the comment preamble.
    #[serde(default = "default_comment_preamble")]
    pub comment_preamble: String,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            line_break: default_line_break(),
            description_preamble: default_description_preamble(),
            comment_preamble: default_comment_preamble(),
        }
    }
}

pub(crate) fn default_work_item_type() -> String {
    "Task".to_string()
}

pub(crate) fn default_api_version() -> String {
    "7.0".to_string()
}

pub(crate) fn default_issue_limit() -> usize {
    10_000
}

pub(crate) fn default_max_attempts() -> u32 {
    5
}

pub(crate) fn default_initial_delay_ms() -> u64 {
    3_000
}

pub(crate) fn default_max_delay_ms() -> u64 {
    60_000
}

pub(crate) fn default_multiplier() -> f64 {
    2.0
}

pub(crate) fn default_line_break() -> String {
    "<br />".to_string()
}

/// Default description preamble.
pub fn default_description_preamble() -> String {
    "[Migrated from <a href=\"{{source_url}}\">YouTrack</a>, originally reported by {{author}} on {{created}}]".to_string()
}

/// Default comment preamble.
pub fn default_comment_preamble() -> String {
    "[Migrated from <a href=\"{{source_url}}\">YouTrack</a>. Original comment by {{author}} on {{created}}]".to_string()
}
