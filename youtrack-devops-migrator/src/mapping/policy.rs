//! The mapping policy extension point.

use super::FieldDirective;
use crate::source::CustomFields;

/// Lazy sequence of directives produced by a policy.
pub type Directives<'a> = Box<dyn Iterator<Item = FieldDirective> + 'a>;

/// Translates one issue's custom fields into destination field directives.
///
/// Implementations must be pure: the same fields always yield the same
/// directives. A policy that reads a field the issue lacks should yield its
/// own default directive instead of skipping it.
pub trait MappingPolicy: Send + Sync {
    /// Yields the directives for the given fields.
    fn directives<'a>(&'a self, fields: &'a CustomFields) -> Directives<'a>;
}

/// Policy that maps no custom fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCustomFields;

impl MappingPolicy for NoCustomFields {
    fn directives<'a>(&'a self, _fields: &'a CustomFields) -> Directives<'a> {
        Box::new(std::iter::empty())
    }
}

/// Adapts a closure into a [`MappingPolicy`]. See [`policy_fn`].
#[derive(Clone)]
pub struct FnPolicy<F>(F);

/// Wraps a closure returning directives as a [`MappingPolicy`].
///
/// ```
/// use youtrack_devops_migrator::{policy_fn, FieldDirective};
///
/// let policy = policy_fn(|fields| {
///     let priority = match fields.get("Priority").and_then(|v| v.option_name()) {
///         Some("Critical") => 1,
///         _ => 3,
///     };
///     vec![FieldDirective::pre_creation("Microsoft.VSTS.Common.Priority", priority)]
/// });
/// # let _ = policy;
/// ```
pub fn policy_fn<F, I>(f: F) -> FnPolicy<F>
where
    F: Fn(&CustomFields) -> I + Send + Sync,
    I: IntoIterator<Item = FieldDirective>,
    I::IntoIter: 'static,
{
    FnPolicy(f)
}

impl<F, I> MappingPolicy for FnPolicy<F>
where
    F: Fn(&CustomFields) -> I + Send + Sync,
    I: IntoIterator<Item = FieldDirective>,
    I::IntoIter: 'static,
{
    fn directives<'a>(&'a self, fields: &'a CustomFields) -> Directives<'a> {
        Box::new((self.0)(fields).into_iter())
    }
}
