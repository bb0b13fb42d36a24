//! Field directives and phased field updates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a field can be set in the creation request or must wait for an identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Sent as part of the work item creation payload.
    #[default]
    PreCreation,
    /// Sent as a follow-up patch once the work item exists.
    PostCreation,
}

/// Abstract instruction emitted by a mapping policy: set `field` to `value` during `phase`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDirective {
    /// Destination field reference name, e.g. `Microsoft.VSTS.Common.Priority`.
    pub field: String,
    /// Value to write.
    pub value: Value,
    /// When the value is written.
    pub phase: Phase,
}

impl FieldDirective {
    /// Creates a directive.
    pub fn new(field: impl Into<String>, value: impl Into<Value>, phase: Phase) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            phase,
        }
    }

    /// Creates a directive written at creation time.
    pub fn pre_creation(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, value, Phase::PreCreation)
    }

    /// Creates a directive written after creation.
    pub fn post_creation(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, value, Phase::PostCreation)
    }
}

/// A directive resolved to a destination field path.
///
/// Pre-creation updates must not depend on the work item's own identifier,
/// which does not exist when the creation payload is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    /// JSON-Patch path, e.g. `/fields/System.Title`.
    pub path: String,
    /// Value to write.
    pub value: Value,
    /// When the value is written.
    pub phase: Phase,
}

impl From<FieldDirective> for FieldUpdate {
    fn from(directive: FieldDirective) -> Self {
        Self {
            path: format!("/fields/{}", directive.field),
            value: directive.value,
            phase: directive.phase,
        }
    }
}
