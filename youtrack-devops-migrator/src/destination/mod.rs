//! Azure DevOps work item tracking client.
//!
//! The destination is a pure I/O sink: the engine drives it through the
//! [`DestinationTracker`] trait and [`DevOpsClient`] implements it over REST.

mod error;
mod operation;

pub use error::DestinationError;
pub use operation::{PatchOp, PatchOperation, ATTACHED_FILE_RELATION};

use crate::config::DestinationSettings;
use crate::rate_limit::{throttled_retry_after, wait_for_retry_after, wait_if_needed, RateLimitInfo};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

/// Resends allowed for a single throttled request.
const MAX_THROTTLE_RESENDS: u32 = 3;

/// Longest response excerpt kept in errors.
const MAX_BODY_EXCERPT: usize = 2048;

/// Write operations the migration needs from the destination tracker.
#[async_trait]
pub trait DestinationTracker: Send + Sync {
    /// Creates a work item from field operations and returns the raw response.
    ///
    /// The response is returned even when it describes an error so callers
    /// can report it; it carries an `id` only on success.
    async fn create_work_item(&self, operations: &[PatchOperation])
        -> Result<Value, DestinationError>;

    /// Applies field or relation operations to an existing work item.
    async fn update_work_item(
        &self,
        id: u64,
        operations: &[PatchOperation],
    ) -> Result<(), DestinationError>;

    /// Posts a comment on a work item.
    async fn add_comment(&self, id: u64, text: &str) -> Result<(), DestinationError>;

    /// Uploads raw bytes and returns the attachment reference URL.
    async fn upload_attachment(
        &self,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<String, DestinationError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: Option<String>,
}

/// REST client for one Azure DevOps project.
#[derive(Debug, Clone)]
pub struct DevOpsClient {
    client: Client,
    base: Url,
    auth_header: String,
    work_item_type: String,
    api_version: String,
}

impl DevOpsClient {
    /// Creates a client for the configured organization and project.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError`] if the organization URL cannot hold a
    /// path or the HTTP client cannot be built.
    pub fn new(settings: &DestinationSettings, token: &str) -> Result<Self, DestinationError> {
        let mut base = settings.organization.clone();
        base.path_segments_mut()
            .map_err(|()| DestinationError::InvalidUrl {
                url: settings.organization.to_string(),
            })?
            .pop_if_empty()
            .extend([settings.project.as_str(), "_apis", "wit"]);

        let client = Client::builder()
            .user_agent(concat!("youtrack-devops-migrator/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(DestinationError::Client)?;

        Ok(Self {
            client,
            base,
            auth_header: basic_auth_header(token),
            work_item_type: settings.work_item_type.clone(),
            api_version: settings.api_version.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    /// Sends a request, honouring throttling responses and headers.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, DestinationError> {
        let request = request.header(AUTHORIZATION, &self.auth_header);
        let mut resends = 0;

        loop {
            let Some(attempt) = request.try_clone() else {
                return Ok(request.send().await?);
            };
            let response = attempt.send().await?;

            if let Some(retry_after) = throttled_retry_after(response.status(), response.headers())
            {
                if resends < MAX_THROTTLE_RESENDS {
                    resends += 1;
                    wait_for_retry_after(retry_after).await;
                    continue;
                }
            }

            if let Some(info) = RateLimitInfo::from_headers(response.headers()) {
                wait_if_needed(&info).await;
            }
            return Ok(response);
        }
    }

    async fn ensure_success(response: Response) -> Result<Response, DestinationError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(DestinationError::Status {
            status,
            body: excerpt(body),
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<(T, String), DestinationError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        match serde_json::from_str(&body) {
            Ok(value) => Ok((value, body)),
            Err(source) => Err(DestinationError::Decode {
                status,
                body: excerpt(body),
                source,
            }),
        }
    }

    fn json_patch(&self, request: RequestBuilder, operations: &[PatchOperation]) -> RequestBuilder {
        request
            .query(&[("api-version", self.api_version.as_str())])
            .header(CONTENT_TYPE, "application/json-patch+json")
            .json(operations)
    }
}

#[async_trait]
impl DestinationTracker for DevOpsClient {
    async fn create_work_item(
        &self,
        operations: &[PatchOperation],
    ) -> Result<Value, DestinationError> {
        let type_segment = format!("${}", self.work_item_type);
        let url = self.endpoint(&["workitems", type_segment.as_str()]);
        debug!(%url, operations = operations.len(), "Creating work item");

        let response = self
            .execute(self.json_patch(self.client.post(url), operations))
            .await?;
        let (value, _) = Self::decode::<Value>(response).await?;
        Ok(value)
    }

    async fn update_work_item(
        &self,
        id: u64,
        operations: &[PatchOperation],
    ) -> Result<(), DestinationError> {
        let url = self.endpoint(&["workitems", id.to_string().as_str()]);
        debug!(%url, operations = operations.len(), "Updating work item");

        let response = self
            .execute(self.json_patch(self.client.patch(url), operations))
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn add_comment(&self, id: u64, text: &str) -> Result<(), DestinationError> {
        let url = self.endpoint(&["workItems", id.to_string().as_str(), "comments"]);
        let api_version = format!("{}-preview.3", self.api_version);
        debug!(%url, "Adding comment");

        let request = self
            .client
            .post(url)
            .query(&[("api-version", api_version.as_str())])
            .json(&json!({ "text": text }));
        let response = self.execute(request).await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn upload_attachment(
        &self,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<String, DestinationError> {
        let url = self.endpoint(&["attachments"]);
        debug!(%url, file_name, bytes = content.len(), "Uploading attachment");

        let request = self
            .client
            .post(url)
            .query(&[
                ("fileName", file_name),
                ("api-version", self.api_version.as_str()),
            ])
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(content);
        let response = Self::ensure_success(self.execute(request).await?).await?;
        let (upload, body) = Self::decode::<UploadResponse>(response).await?;

        upload
            .url
            .filter(|url| !url.is_empty())
            .ok_or(DestinationError::MissingReference {
                body: excerpt(body),
            })
    }
}

/// Builds the basic authorization header for a personal access token.
#[must_use]
pub fn basic_auth_header(token: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!(":{token}")))
}

fn excerpt(mut body: String) -> String {
    if body.len() > MAX_BODY_EXCERPT {
        let mut end = MAX_BODY_EXCERPT;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}
