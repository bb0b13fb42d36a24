//! Declarative mapping policy configured through `[[fields]]` rules.

use super::{Directives, FieldDirective, MappingPolicy, Phase};
use crate::source::{CustomFields, FieldValue};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// One `[[fields]]` rule: copy a source custom field into a destination field.
///
/// ```toml
/// [[fields]]
/// source = "Priority"
/// target = "Microsoft.VSTS.Common.Priority"
/// default = 3
/// values = { Critical = 1, Major = 2 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FieldRule {
    /// Source custom field name.
    pub source: String,

    /// Destination field reference name.
    pub target: String,

    /// When the value is written.
    #[serde(default)]
    pub phase: Phase,

    /// Value used when the field is absent, unset, or its option is not translated.
    pub default: Value,

    /// Option name to destination value translation table.
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
}

impl FieldRule {
    /// Resolves the destination value for this rule.
    #[must_use]
    pub fn resolve(&self, fields: &CustomFields) -> Value {
        let value = match fields.get(&self.source) {
            None | Some(FieldValue::Null) => {
                debug!(field = %self.source, "Field unset, using default");
                return self.default.clone();
            }
            Some(value) => value,
        };

        if self.values.is_empty() {
            return match value.to_json() {
                Value::Null => self.default.clone(),
                natural => natural,
            };
        }

        value
            .option_name()
            .and_then(|name| self.values.get(name))
            .cloned()
            .unwrap_or_else(|| {
                debug!(
                    field = %self.source,
                    option = ?value.option_name(),
                    "Option not translated, using default"
                );
                self.default.clone()
            })
    }
}

/// Mapping policy evaluating a list of [`FieldRule`]s in order.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedPolicy {
    rules: Vec<FieldRule>,
}

impl RuleBasedPolicy {
    /// Creates a policy from rules.
    #[must_use]
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// Returns the configured rules.
    #[must_use]
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }
}

impl MappingPolicy for RuleBasedPolicy {
    fn directives<'a>(&'a self, fields: &'a CustomFields) -> Directives<'a> {
        Box::new(
            self.rules
                .iter()
                .map(move |rule| FieldDirective::new(&rule.target, rule.resolve(fields), rule.phase)),
        )
    }
}
