//! In-memory trackers that record every call.

use crate::destination::{DestinationError, DestinationTracker, PatchOperation};
use crate::source::{Attachment, Comment, SourceError, SourceIssue, SourceTracker, UserRef};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use url::Url;

pub(crate) const SOURCE_BASE: &str = "https://src.example";

/// Source tracker backed by maps.
pub(crate) struct FakeSource {
    base_url: Url,
    ids: Vec<String>,
    issues: HashMap<String, SourceIssue>,
    files: HashMap<String, Vec<u8>>,
    list_fails: bool,
    pub(crate) fetches: Mutex<Vec<String>>,
    pub(crate) downloads: Mutex<Vec<String>>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self {
            base_url: Url::parse(SOURCE_BASE).unwrap(),
            ids: Vec::new(),
            issues: HashMap::new(),
            files: HashMap::new(),
            list_fails: false,
            fetches: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_issue(mut self, issue: SourceIssue) -> Self {
        self.ids.push(issue.id.clone());
        self.issues.insert(issue.id.clone(), issue);
        self
    }

    pub(crate) fn with_file(mut self, url: &str, content: &[u8]) -> Self {
        self.files.insert(url.to_string(), content.to_vec());
        self
    }

    pub(crate) fn failing_listing(mut self) -> Self {
        self.list_fails = true;
        self
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

#[async_trait]
impl SourceTracker for FakeSource {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn list_issue_ids(
        &self,
        _project: &str,
        limit: usize,
    ) -> Result<Vec<String>, SourceError> {
        if self.list_fails {
            return Err(not_found("issues"));
        }
        Ok(self.ids.iter().take(limit).cloned().collect())
    }

    async fn fetch_issue(&self, id: &str) -> Result<SourceIssue, SourceError> {
        self.fetches.lock().unwrap().push(id.to_string());
        self.issues.get(id).cloned().ok_or_else(|| not_found(id))
    }

    async fn download(&self, url: &Url) -> Result<Vec<u8>, SourceError> {
        self.downloads.lock().unwrap().push(url.to_string());
        self.files
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| not_found(url.as_str()))
    }
}

fn not_found(url: &str) -> SourceError {
    SourceError::Status {
        url: url.to_string(),
        status: 404,
        body: String::new(),
    }
}

/// A call received by [`FakeDestination`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DestinationCall {
    Create(Vec<PatchOperation>),
    Update(u64, Vec<PatchOperation>),
    Comment(u64, String),
    Upload(String, Vec<u8>),
}

/// Destination tracker that assigns sequential identifiers.
pub(crate) struct FakeDestination {
    next_id: AtomicU64,
    scripted_creates: Mutex<VecDeque<Result<Value, DestinationError>>>,
    update_fails: bool,
    upload_fails: bool,
    pub(crate) calls: Mutex<Vec<DestinationCall>>,
}

impl FakeDestination {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(100),
            scripted_creates: Mutex::new(VecDeque::new()),
            update_fails: false,
            upload_fails: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queues a response for the next creation call; later calls succeed.
    pub(crate) fn with_create_response(self, response: Result<Value, DestinationError>) -> Self {
        self.scripted_creates.lock().unwrap().push_back(response);
        self
    }

    pub(crate) fn failing_updates(mut self) -> Self {
        self.update_fails = true;
        self
    }

    pub(crate) fn failing_uploads(mut self) -> Self {
        self.upload_fails = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<DestinationCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: DestinationCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DestinationTracker for FakeDestination {
    async fn create_work_item(
        &self,
        operations: &[PatchOperation],
    ) -> Result<Value, DestinationError> {
        self.record(DestinationCall::Create(operations.to_vec()));
        if let Some(response) = self.scripted_creates.lock().unwrap().pop_front() {
            return response;
        }
        Ok(json!({ "id": self.next_id.fetch_add(1, Ordering::SeqCst) }))
    }

    async fn update_work_item(
        &self,
        id: u64,
        operations: &[PatchOperation],
    ) -> Result<(), DestinationError> {
        self.record(DestinationCall::Update(id, operations.to_vec()));
        if self.update_fails {
            return Err(DestinationError::Status {
                status: 400,
                body: "rejected".to_string(),
            });
        }
        Ok(())
    }

    async fn add_comment(&self, id: u64, text: &str) -> Result<(), DestinationError> {
        self.record(DestinationCall::Comment(id, text.to_string()));
        Ok(())
    }

    async fn upload_attachment(
        &self,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<String, DestinationError> {
        self.record(DestinationCall::Upload(file_name.to_string(), content));
        if self.upload_fails {
            return Err(DestinationError::MissingReference {
                body: "{}".to_string(),
            });
        }
        Ok(format!("https://dst.example/attachments/{file_name}"))
    }
}

/// A decode failure like the destination's intermittent one.
pub(crate) fn decode_failure() -> DestinationError {
    DestinationError::Decode {
        status: 200,
        body: "<html>".to_string(),
        source: serde_json::from_str::<Value>("<html>").unwrap_err(),
    }
}

pub(crate) fn issue(id: &str, summary: &str) -> SourceIssue {
    SourceIssue {
        id: id.to_string(),
        summary: summary.to_string(),
        description: None,
        created: 0,
        reporter: Some(user("alice")),
        custom_fields: Default::default(),
        comments: Vec::new(),
        attachments: Vec::new(),
    }
}

pub(crate) fn comment(created: i64, author: &str, text: &str) -> Comment {
    Comment {
        created,
        author: Some(user(author)),
        text: Some(text.to_string()),
        attachments: Vec::new(),
    }
}

pub(crate) fn remote_attachment(name: &str, url: &str) -> Attachment {
    Attachment {
        name: name.to_string(),
        url: Some(url.to_string()),
        base64_content: None,
    }
}

fn user(login: &str) -> UserRef {
    UserRef {
        login: login.to_string(),
    }
}
