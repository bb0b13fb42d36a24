//! YouTrack REST client.
//!
//! The source tracker is only read: issue enumeration, single-issue fetches
//! with comments and attachments nested, and attachment downloads.

mod error;
mod types;

pub use error::SourceError;
pub use types::{
    Attachment, Comment, ContentLocator, CustomField, CustomFields, FieldRecord, FieldValue,
    SourceIssue, UserRef,
};

use crate::config::SourceSettings;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Field projection for a full issue fetch; nests comments and attachments
/// so one request returns everything the migration needs.
pub const ISSUE_FIELDS: &str = "idReadable,summary,description,created,reporter(login),\
customFields(name,value(avatarUrl,buildLink,color(id),fullName,id,isResolved,localizedName,\
login,minutes,name,presentation,text)),\
comments(created,author(login),text,attachments(name,url,base64Content)),\
attachments(name,url,base64Content)";

/// Read operations the migration needs from the source tracker.
#[async_trait]
pub trait SourceTracker: Send + Sync {
    /// Base URL that issue links and relative attachment URLs resolve against.
    fn base_url(&self) -> &Url;

    /// Lists up to `limit` issue identifiers in `project`.
    async fn list_issue_ids(&self, project: &str, limit: usize)
        -> Result<Vec<String>, SourceError>;

    /// Fetches one issue with its custom fields, comments and attachments.
    async fn fetch_issue(&self, id: &str) -> Result<SourceIssue, SourceError>;

    /// Downloads attachment content from an absolute URL. Credentials are
    /// only sent when the URL shares the base URL's origin.
    async fn download(&self, url: &Url) -> Result<Vec<u8>, SourceError>;
}

#[derive(Debug, Deserialize)]
struct IssueRef {
    #[serde(rename = "idReadable")]
    id: String,
}

/// REST client for a YouTrack instance.
#[derive(Debug, Clone)]
pub struct YouTrackClient {
    client: Client,
    base_url: Url,
    auth_header: Option<String>,
}

impl YouTrackClient {
    /// Creates a client from the `[source]` settings.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Client`] if the HTTP client cannot be built.
    pub fn new(settings: &SourceSettings) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(concat!("youtrack-devops-migrator/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(120))
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(SourceError::Client)?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            auth_header: settings.token.as_deref().map(bearer_auth_header),
        })
    }

    fn api_url(&self, path: &str) -> Result<Url, SourceError> {
        let url = format!("{}/api/{path}", self.base_url.as_str().trim_end_matches('/'));
        Url::parse(&url).map_err(|source| SourceError::InvalidUrl { url, source })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_header {
            Some(header) => request.header(AUTHORIZATION, header),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let request = self.authorized(self.client.get(url.clone()).query(query));
        let body = self.send(request, &url).await?;
        serde_json::from_slice(&body).map_err(|source| SourceError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Vec<u8>, SourceError> {
        let response = request.send().await.map_err(|source| SourceError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|source| SourceError::Request {
                url: url.to_string(),
                source,
            })
    }
}

#[async_trait]
impl SourceTracker for YouTrackClient {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn list_issue_ids(
        &self,
        project: &str,
        limit: usize,
    ) -> Result<Vec<String>, SourceError> {
        let url = self.api_url("issues")?;
        let top = limit.to_string();
        let query = project_query(project);
        debug!(%url, project, limit, "Listing issues");

        let issues: Vec<IssueRef> = self
            .get_json(
                url,
                &[("fields", "idReadable"), ("$top", top.as_str()), ("query", query.as_str())],
            )
            .await?;
        Ok(issues.into_iter().map(|issue| issue.id).collect())
    }

    async fn fetch_issue(&self, id: &str) -> Result<SourceIssue, SourceError> {
        let url = self.api_url(&format!("issues/{id}"))?;
        debug!(%url, "Fetching issue");

        let mut issue: SourceIssue = self.get_json(url, &[("fields", ISSUE_FIELDS)]).await?;
        if issue.id.is_empty() {
            issue.id = id.to_string();
        }
        Ok(issue)
    }

    async fn download(&self, url: &Url) -> Result<Vec<u8>, SourceError> {
        let request = self.client.get(url.clone());
        let request = if url.origin() == self.base_url.origin() {
            self.authorized(request)
        } else {
            debug!(%url, "Foreign attachment host, sending no credentials");
            request
        };
        debug!(%url, "Downloading attachment");
        self.send(request, url).await
    }
}

/// Builds the bearer authorization header for a permanent token.
#[must_use]
pub fn bearer_auth_header(token: &str) -> String {
    format!("Bearer {token}")
}

/// YouTrack search query selecting every issue in `project`.
fn project_query(project: &str) -> String {
    format!("project: {{{project}}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base: &str, token: Option<&str>) -> SourceSettings {
        SourceSettings {
            base_url: Url::parse(base).unwrap(),
            token: token.map(str::to_string),
            accept_invalid_certs: false,
        }
    }

    #[test]
    fn builds_api_urls_under_context_path() {
        let client = YouTrackClient::new(&settings("https://yt.example/youtrack/", None)).unwrap();
        assert_eq!(
            client.api_url("issues/DEMO-1").unwrap().as_str(),
            "https://yt.example/youtrack/api/issues/DEMO-1"
        );
    }

    #[test]
    fn token_is_optional() {
        let anonymous = YouTrackClient::new(&settings("https://yt.example", None)).unwrap();
        assert!(anonymous.auth_header.is_none());

        let authed = YouTrackClient::new(&settings("https://yt.example", Some("perm:x"))).unwrap();
        assert_eq!(authed.auth_header.as_deref(), Some("Bearer perm:x"));
    }

    #[test]
    fn project_query_braces_names_with_spaces() {
        assert_eq!(project_query("My Project"), "project: {My Project}");
    }
}
