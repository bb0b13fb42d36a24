//! Migrator configuration.
//!
//! This module parses `migrator.toml` into an immutable [`MigratorConfig`]
//! that is built once per run and handed to the clients and the runner.

mod error;
mod sections;

pub use error::ConfigError;
pub use sections::{
    default_comment_preamble, default_description_preamble, ContentSettings,
    DestinationSettings, FailurePolicy, RetrySettings, RunSettings, SourceSettings,
    DESTINATION_TOKEN_ENV, SOURCE_TOKEN_ENV,
};

use crate::mapping::{FieldRule, RuleBasedPolicy};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// Configuration for one migration run.
///
/// ```toml
/// [source]
/// base-url = "https://youtrack.example.com"
///
/// [destination]
/// organization = "https://dev.azure.com/acme"
/// project = "Boards"
///
/// [run]
/// project = "DEMO"
///
/// [[fields]]
/// source = "Priority"
/// target = "Microsoft.VSTS.Common.Priority"
/// default = 3
/// values = { Critical = 1, Major = 2 }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct MigratorConfig {
    source: SourceSettings,
    destination: DestinationSettings,
    #[serde(default)]
    run: RunSettings,
    #[serde(default)]
    retry: RetrySettings,
    #[serde(default)]
    content: ContentSettings,
    #[serde(default)]
    fields: Vec<FieldRule>,
}

impl MigratorConfig {
    /// Loads and validates a configuration file.
    ///
    /// Tokens missing from the file are taken from [`SOURCE_TOKEN_ENV`] and
    /// [`DESTINATION_TOKEN_ENV`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unparsable or invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!(path = %path.display(), "Loading configuration");

        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::parse(&content, &path.display().to_string())
    }

    /// Parses and validates configuration text. `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is unparsable or invalid.
    pub fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content).map_err(|e| ConfigError::TomlError {
            path: origin.to_string(),
            source: e,
        })?;
        config.fill_tokens_from_env();
        config.validate(origin)?;
        debug!(rules = config.fields.len(), "Configuration loaded");
        Ok(config)
    }

    fn fill_tokens_from_env(&mut self) {
        if self.source.token.is_none() {
            self.source.token = env_token(SOURCE_TOKEN_ENV);
        }
        if self.destination.token.is_none() {
            self.destination.token = env_token(DESTINATION_TOKEN_ENV);
        }
    }

    fn validate(&self, origin: &str) -> Result<(), ConfigError> {
        let fail = |message: String| {
            Err(ConfigError::ValidationError {
                path: origin.to_string(),
                message,
            })
        };

        if self.destination.project.trim().is_empty() {
            return fail("destination.project must not be empty".to_string());
        }
        if self.destination.work_item_type.trim().is_empty() {
            return fail("destination.work-item-type must not be empty".to_string());
        }
        if self.run.issue_limit == 0 {
            return fail("run.issue-limit must be at least 1".to_string());
        }
        if self.retry.max_attempts == 0 {
            return fail("retry.max-attempts must be at least 1".to_string());
        }
        if self.retry.multiplier.is_nan() || self.retry.multiplier < 1.0 {
            return fail("retry.multiplier must be at least 1.0".to_string());
        }
        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            return fail("retry.initial-delay-ms must not exceed retry.max-delay-ms".to_string());
        }
        for (index, rule) in self.fields.iter().enumerate() {
            if rule.source.trim().is_empty() || rule.target.trim().is_empty() {
                return fail(format!(
                    "fields[{index}] must name both a source and a target"
                ));
            }
        }

        Ok(())
    }

    /// Overrides the source project.
    #[must_use]
    pub fn with_project(mut self, project: String) -> Self {
        self.run.project = Some(project);
        self
    }

    /// Overrides the issue cap.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if `limit` is zero.
    pub fn with_issue_limit(mut self, limit: usize) -> Result<Self, ConfigError> {
        if limit == 0 {
            return Err(ConfigError::ValidationError {
                path: "--limit".to_string(),
                message: "issue limit must be at least 1".to_string(),
            });
        }
        self.run.issue_limit = limit;
        Ok(self)
    }

    /// Overrides the source token.
    #[must_use]
    pub fn with_source_token(mut self, token: String) -> Self {
        self.source.token = Some(token);
        self
    }

    /// Overrides the destination token.
    #[must_use]
    pub fn with_destination_token(mut self, token: String) -> Self {
        self.destination.token = Some(token);
        self
    }

    /// Overrides the failure policy.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.run.on_failure = policy;
        self
    }

    /// Returns the source settings.
    pub fn source(&self) -> &SourceSettings {
        &self.source
    }

    /// Returns the source base URL.
    pub fn source_base_url(&self) -> &Url {
        &self.source.base_url
    }

    /// Returns the destination settings.
    pub fn destination(&self) -> &DestinationSettings {
        &self.destination
    }

    /// Returns the destination token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] when no token is configured.
    pub fn destination_token(&self) -> Result<&str, ConfigError> {
        self.destination
            .token
            .as_deref()
            .ok_or_else(|| ConfigError::MissingCredential {
                name: "destination.token".to_string(),
                env: DESTINATION_TOKEN_ENV.to_string(),
            })
    }

    /// Returns the run settings.
    pub fn run(&self) -> &RunSettings {
        &self.run
    }

    /// Returns the source project to migrate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] when no project is configured.
    pub fn project(&self) -> Result<&str, ConfigError> {
        self.run
            .project
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ConfigError::ValidationError {
                path: "run.project".to_string(),
                message: "no source project configured".to_string(),
            })
    }

    /// Returns the retry settings.
    pub fn retry(&self) -> &RetrySettings {
        &self.retry
    }

    /// Returns the content settings.
    pub fn content(&self) -> &ContentSettings {
        &self.content
    }

    /// Returns the configured field rules.
    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    /// Builds the rule-based mapping policy from `[[fields]]`.
    pub fn mapping_policy(&self) -> RuleBasedPolicy {
        RuleBasedPolicy::new(self.fields.clone())
    }
}

fn env_token(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Phase;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
[source]
base-url = "https://youtrack.example.com"

[destination]
organization = "https://dev.azure.com/acme"
project = "Boards"
"#;

    fn without_token_env<T>(f: impl FnOnce() -> T) -> T {
        temp_env::with_vars_unset([SOURCE_TOKEN_ENV, DESTINATION_TOKEN_ENV], f)
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = without_token_env(|| MigratorConfig::parse(MINIMAL, "test").unwrap());

        assert_eq!(config.destination().work_item_type, "Task");
        assert_eq!(config.destination().api_version, "7.0");
        assert_eq!(config.run().issue_limit, 10_000);
        assert_eq!(config.run().on_failure, FailurePolicy::Abort);
        assert_eq!(config.retry().max_attempts, 5);
        assert_eq!(config.content().line_break, "<br />");
        assert!(config.source().token.is_none());
        assert!(config.fields().is_empty());
        assert!(matches!(
            config.destination_token(),
            Err(ConfigError::MissingCredential { .. })
        ));
        assert!(config.project().is_err());
    }

    #[test]
    fn parses_full_config() {
        let text = r#"
[source]
base-url = "https://youtrack.example.com/youtrack"
token = "perm:abc"
accept-invalid-certs = true

[destination]
organization = "https://dev.azure.com/acme"
project = "Boards"
work-item-type = "Bug"
token = "pat"

[run]
project = "DEMO"
issue-limit = 50
on-failure = "continue"

[retry]
max-attempts = 3
initial-delay-ms = 10
max-delay-ms = 100
multiplier = 1.5

[content]
line-break = "<br/>"

[[fields]]
source = "Priority"
target = "Microsoft.VSTS.Common.Priority"
default = 3
values = { Critical = 1 }

[[fields]]
source = "State"
target = "System.State"
phase = "post-creation"
default = "New"
"#;
        let config = without_token_env(|| MigratorConfig::parse(text, "test").unwrap());

        assert_eq!(
            config.source_base_url().as_str(),
            "https://youtrack.example.com/youtrack"
        );
        assert_eq!(config.source().token.as_deref(), Some("perm:abc"));
        assert!(config.source().accept_invalid_certs);
        assert_eq!(config.destination().work_item_type, "Bug");
        assert_eq!(config.destination_token().unwrap(), "pat");
        assert_eq!(config.project().unwrap(), "DEMO");
        assert_eq!(config.run().issue_limit, 50);
        assert_eq!(config.run().on_failure, FailurePolicy::Continue);
        assert_eq!(config.retry().max_attempts, 3);
        assert_eq!(config.content().line_break, "<br/>");
        assert_eq!(config.fields().len(), 2);
        assert_eq!(config.fields()[1].phase, Phase::PostCreation);
        assert_eq!(config.fields()[1].default, json!("New"));
    }

    #[test]
    fn tokens_fall_back_to_environment() {
        let config = temp_env::with_vars(
            [
                (SOURCE_TOKEN_ENV, Some("yt-env")),
                (DESTINATION_TOKEN_ENV, Some("ado-env")),
            ],
            || MigratorConfig::parse(MINIMAL, "test").unwrap(),
        );

        assert_eq!(config.source().token.as_deref(), Some("yt-env"));
        assert_eq!(config.destination_token().unwrap(), "ado-env");
    }

    #[test]
    fn file_tokens_win_over_environment() {
        let text = MINIMAL.replace(
            "project = \"Boards\"",
            "project = \"Boards\"\ntoken = \"ado-file\"",
        );
        let config = temp_env::with_vars(
            [
                (SOURCE_TOKEN_ENV, Some("yt-env")),
                (DESTINATION_TOKEN_ENV, Some("ado-env")),
            ],
            || MigratorConfig::parse(&text, "test").unwrap(),
        );

        assert_eq!(config.destination_token().unwrap(), "ado-file");
        assert_eq!(config.source().token.as_deref(), Some("yt-env"));
    }

    #[test]
    fn overrides_take_precedence() {
        let config = without_token_env(|| MigratorConfig::parse(MINIMAL, "test").unwrap())
            .with_project("OTHER".to_string())
            .with_issue_limit(3)
            .unwrap()
            .with_destination_token("cli".to_string());

        assert_eq!(config.project().unwrap(), "OTHER");
        assert_eq!(config.run().issue_limit, 3);
        assert_eq!(config.destination_token().unwrap(), "cli");
    }

    #[test]
    fn zero_issue_limit_override_is_rejected() {
        let config = without_token_env(|| MigratorConfig::parse(MINIMAL, "test").unwrap());

        let result = config.with_issue_limit(0);

        assert!(matches!(
            result,
            Err(ConfigError::ValidationError { ref message, .. }) if message.contains("at least 1")
        ));
    }

    #[test]
    fn rejects_invalid_url() {
        let text = MINIMAL.replace("https://youtrack.example.com", "not a url");
        let result = without_token_env(|| MigratorConfig::parse(&text, "test"));
        assert!(matches!(result, Err(ConfigError::TomlError { .. })));
    }

    #[test]
    fn rejects_unknown_keys() {
        let text = format!("{MINIMAL}\n[run]\nprojekt = \"DEMO\"\n");
        let result = without_token_env(|| MigratorConfig::parse(&text, "test"));
        assert!(matches!(result, Err(ConfigError::TomlError { .. })));
    }

    #[test]
    fn rejects_zero_attempts() {
        let text = format!("{MINIMAL}\n[retry]\nmax-attempts = 0\n");
        let result = without_token_env(|| MigratorConfig::parse(&text, "test"));
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn rejects_rule_without_target() {
        let text = format!("{MINIMAL}\n[[fields]]\nsource = \"Priority\"\ntarget = \"\"\ndefault = 1\n");
        let result = without_token_env(|| MigratorConfig::parse(&text, "test"));
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn load_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("migrator.toml");
        fs::write(&path, MINIMAL).unwrap();

        let config = without_token_env(|| MigratorConfig::load(&path).unwrap());
        assert_eq!(config.destination().project, "Boards");
    }

    #[test]
    fn load_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = MigratorConfig::load(&temp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }
}
