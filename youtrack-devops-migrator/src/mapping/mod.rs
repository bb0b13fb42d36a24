//! Custom field mapping.
//!
//! Turns a source issue's custom fields into destination field updates using a
//! caller-supplied [`MappingPolicy`], then splits them by [`Phase`] into the
//! creation payload and the follow-up patch. No I/O happens here.

mod directive;
mod policy;
mod rules;

pub use directive::{FieldDirective, FieldUpdate, Phase};
pub use policy::{policy_fn, Directives, FnPolicy, MappingPolicy, NoCustomFields};
pub use rules::{FieldRule, RuleBasedPolicy};

use crate::source::CustomFields;

/// Field updates for one issue, partitioned by phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPlan {
    /// Updates included in the creation payload.
    pub create: Vec<FieldUpdate>,
    /// Updates patched onto the created work item.
    pub deferred: Vec<FieldUpdate>,
}

impl FieldPlan {
    /// Evaluates `policy` against `fields` and partitions the result.
    #[must_use]
    pub fn build(fields: &CustomFields, policy: &dyn MappingPolicy) -> Self {
        map_fields(fields, policy).into_iter().collect()
    }
}

impl FromIterator<FieldUpdate> for FieldPlan {
    fn from_iter<T: IntoIterator<Item = FieldUpdate>>(iter: T) -> Self {
        let (create, deferred) = iter
            .into_iter()
            .partition(|update| update.phase == Phase::PreCreation);
        Self { create, deferred }
    }
}

/// Evaluates `policy` against `fields`, preserving directive order.
#[must_use]
pub fn map_fields(fields: &CustomFields, policy: &dyn MappingPolicy) -> Vec<FieldUpdate> {
    policy.directives(fields).map(FieldUpdate::from).collect()
}
