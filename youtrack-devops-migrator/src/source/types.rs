//! Source issue snapshot as returned by the YouTrack REST API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity reference (reporter, comment author).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserRef {
    /// Login name.
    pub login: String,
}

/// Login used when the source no longer knows the user.
const UNKNOWN_USER: &str = "unknown";

fn login_or_unknown(user: Option<&UserRef>) -> &str {
    user.map_or(UNKNOWN_USER, |u| u.login.as_str())
}

/// Immutable snapshot of one source issue, fetched once per migration attempt.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceIssue {
    /// Readable identifier (e.g. `DEMO-1`).
    #[serde(rename = "idReadable", default)]
    pub id: String,

    /// Issue title.
    #[serde(default)]
    pub summary: String,

    /// Issue body. YouTrack returns `null` for an empty description.
    #[serde(default)]
    pub description: Option<String>,

    /// Creation time in epoch milliseconds.
    pub created: i64,

    /// Reporter, absent when the account was deleted.
    #[serde(default)]
    pub reporter: Option<UserRef>,

    /// Custom fields in source order.
    #[serde(default)]
    pub custom_fields: CustomFields,

    /// Comments in source order.
    #[serde(default)]
    pub comments: Vec<Comment>,

    /// Issue-level attachments in source order.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl SourceIssue {
    /// Reporter login, or `unknown`.
    #[must_use]
    pub fn reporter_login(&self) -> &str {
        login_or_unknown(self.reporter.as_ref())
    }
}

/// A comment on a source issue.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Comment {
    /// Creation time in epoch milliseconds.
    pub created: i64,

    /// Comment author.
    #[serde(default)]
    pub author: Option<UserRef>,

    /// Comment body.
    #[serde(default)]
    pub text: Option<String>,

    /// Comment-scoped attachments in source order.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Comment {
    /// Author login, or `unknown`.
    #[must_use]
    pub fn author_login(&self) -> &str {
        login_or_unknown(self.author.as_ref())
    }
}

/// A binary attachment. Names are not unique within an issue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Display name.
    pub name: String,

    /// Download URL, usually relative to the source base URL.
    #[serde(default)]
    pub url: Option<String>,

    /// Inline content as a `data:` URI.
    #[serde(default)]
    pub base64_content: Option<String>,
}

/// Where an attachment's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLocator<'a> {
    /// Inline encoded content, decoded without a network fetch.
    Inline(&'a str),
    /// Remote URL that must be fetched, possibly relative.
    Remote(&'a str),
}

impl Attachment {
    /// Returns the content locator, preferring inline content.
    #[must_use]
    pub fn locator(&self) -> Option<ContentLocator<'_>> {
        if let Some(inline) = self.base64_content.as_deref().filter(|s| !s.is_empty()) {
            return Some(ContentLocator::Inline(inline));
        }
        self.url
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(ContentLocator::Remote)
    }
}

/// Ordered custom fields of one issue, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CustomFields(Vec<CustomField>);

impl CustomFields {
    /// Looks up a field value by name.
    ///
    /// Returns `None` when the issue has no such field. A field that exists
    /// but is unset yields `Some(&FieldValue::Null)`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Iterates fields in source order.
    pub fn iter(&self) -> impl Iterator<Item = &CustomField> {
        self.0.iter()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the issue has no custom fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<CustomField> for CustomFields {
    fn from_iter<T: IntoIterator<Item = CustomField>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One named custom field.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CustomField {
    /// Field name, unique within an issue.
    pub name: String,

    /// Field value.
    #[serde(default)]
    pub value: FieldValue,
}

impl CustomField {
    /// Creates a field.
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Polymorphic custom field value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Unset.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Integer(i64),
    /// Floating point scalar.
    Float(f64),
    /// Text scalar.
    Text(String),
    /// Multi-value field.
    List(Vec<FieldValue>),
    /// Enumerated option, user, version, period or text record.
    Record(FieldRecord),
}

/// Record-shaped field value. Only the members relevant to the field type are set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_resolved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Value>,
}

impl FieldValue {
    /// Creates an enumerated-option value with the given name.
    pub fn option(name: impl Into<String>) -> Self {
        Self::Record(FieldRecord {
            name: Some(name.into()),
            ..FieldRecord::default()
        })
    }

    /// Whether the value is unset.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Name used to look the value up in a translation table.
    ///
    /// Option records resolve to their name (falling back to login, then
    /// presentation); text scalars resolve to themselves.
    #[must_use]
    pub fn option_name(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Record(record) => record
                .name
                .as_deref()
                .or(record.login.as_deref())
                .or(record.presentation.as_deref()),
            _ => None,
        }
    }

    /// Natural JSON scalar for the value, as written to a destination field.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Integer(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Text(s) => Value::String(s.clone()),
            Self::List(values) => Value::Array(values.iter().map(Self::to_json).collect()),
            Self::Record(record) => {
                if let Some(minutes) = record.minutes {
                    return Value::from(minutes);
                }
                record
                    .name
                    .as_ref()
                    .or(record.login.as_ref())
                    .or(record.presentation.as_ref())
                    .or(record.text.as_ref())
                    .or(record.full_name.as_ref())
                    .map_or(Value::Null, |s| Value::String(s.clone()))
            }
        }
    }
}
