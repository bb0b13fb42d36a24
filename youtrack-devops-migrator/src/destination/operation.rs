//! JSON-Patch documents sent to the work item endpoints.

use crate::mapping::FieldUpdate;
use serde::Serialize;
use serde_json::{json, Value};

/// JSON-Patch operation kind. Work items are only ever appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
}

/// One JSON-Patch operation against a work item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    pub from: Option<String>,
    pub value: Value,
}

/// Relation type linking an uploaded attachment to a work item.
pub const ATTACHED_FILE_RELATION: &str = "AttachedFile";

impl PatchOperation {
    /// `add` operation at `path`.
    pub fn add(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            op: PatchOp::Add,
            path: path.into(),
            from: None,
            value: value.into(),
        }
    }

    /// Sets the field with reference name `field`.
    pub fn set_field(field: &str, value: impl Into<Value>) -> Self {
        Self::add(format!("/fields/{field}"), value)
    }

    /// Appends an attached-file relation carrying the original display name.
    pub fn attach_file(url: &str, name: &str) -> Self {
        Self::add(
            "/relations/-",
            json!({
                "rel": ATTACHED_FILE_RELATION,
                "url": url,
                "attributes": { "name": name },
            }),
        )
    }
}

impl From<FieldUpdate> for PatchOperation {
    fn from(update: FieldUpdate) -> Self {
        Self::add(update.path, update.value)
    }
}
