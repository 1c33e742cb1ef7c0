//! reqwest-backed [`GitHubApi`] implementation

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde_json::Value;

use crate::api::GitHubApi;
use crate::requests::{
    CreateIssue, CreateOrUpdateFile, CreatePullRequest, CreateRepository, ForkRepository,
    GetFileContents,
};
use crate::{Result, UpstreamError};

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";

/// Settings needed to build an [`HttpClient`]
#[derive(Clone)]
pub struct HttpClientConfig {
    /// Base URL, e.g. `https://api.github.com` or `https://ghe.example.com/api/v3`
    pub api_url: String,
    /// Personal access token sent as a bearer credential
    pub token: String,
    /// Whole-request timeout
    pub timeout: Duration,
    pub user_agent: String,
}

impl fmt::Debug for HttpClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// GitHub REST client
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
    token: String,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Build a client from its configuration.
    ///
    /// Fails if the base URL does not parse or cannot carry a path.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.api_url).map_err(|e| UpstreamError::InvalidUrl {
            url: config.api_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::InvalidUrl {
                url: config.api_url,
                reason: "URL cannot carry a request path".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: config.token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `segments` to the base URL, percent-encoding each one.
    pub fn endpoint<I, S>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| UpstreamError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry a request path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `/repos/{owner}/{repo}/contents/{path}` with the file path's own
    /// separators kept as path separators.
    pub fn contents_endpoint(&self, owner: &str, repo: &str, path: &str) -> Result<Url> {
        let file_segments = path.split('/').filter(|s| !s.is_empty());
        self.endpoint(
            ["repos", owner, repo, "contents"]
                .into_iter()
                .chain(file_segments),
        )
    }

    async fn send_json<B>(&self, method: Method, url: Url, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        tracing::debug!(%method, %url, "Sending GitHub request");
        let request = self.client.request(method, url).json(body);
        self.execute(request).await
    }

    async fn get(&self, url: Url) -> Result<Value> {
        tracing::debug!(method = %Method::GET, %url, "Sending GitHub request");
        let request = self.client.get(url);
        self.execute(request).await
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Value> {
        let response = request
            .bearer_auth(&self.token)
            .header(ACCEPT, MEDIA_TYPE)
            .header(API_VERSION_HEADER, API_VERSION)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let body = parse_body(text);

        tracing::debug!(status = status.as_u16(), "GitHub responded");

        if status.is_success() {
            return Ok(body);
        }

        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .or_else(|| body.as_str().map(str::to_owned))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_owned());

        Err(UpstreamError::Status {
            status: status.as_u16(),
            message,
            body,
        })
    }
}

/// Empty bodies become `null`, non-JSON bodies are kept as a string.
fn parse_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => Value::String(text),
    }
}

#[async_trait]
impl GitHubApi for HttpClient {
    async fn create_repository(&self, request: CreateRepository) -> Result<Value> {
        let url = self.endpoint(["user", "repos"])?;
        self.send_json(Method::POST, url, &request).await
    }

    async fn create_issue(&self, request: CreateIssue) -> Result<Value> {
        let url = self.endpoint([
            "repos",
            request.owner.as_str(),
            request.repo.as_str(),
            "issues",
        ])?;
        self.send_json(Method::POST, url, &request).await
    }

    async fn create_or_update_file(&self, request: CreateOrUpdateFile) -> Result<Value> {
        let url = self.contents_endpoint(&request.owner, &request.repo, &request.path)?;
        self.send_json(Method::PUT, url, &request).await
    }

    async fn get_file_contents(&self, request: GetFileContents) -> Result<Value> {
        let mut url = self.contents_endpoint(&request.owner, &request.repo, &request.path)?;
        if let Some(branch) = &request.branch {
            url.query_pairs_mut().append_pair("ref", branch);
        }
        self.get(url).await
    }

    async fn create_pull_request(&self, request: CreatePullRequest) -> Result<Value> {
        let url = self.endpoint([
            "repos",
            request.owner.as_str(),
            request.repo.as_str(),
            "pulls",
        ])?;
        self.send_json(Method::POST, url, &request).await
    }

    async fn fork_repository(&self, request: ForkRepository) -> Result<Value> {
        let url = self.endpoint([
            "repos",
            request.owner.as_str(),
            request.repo.as_str(),
            "forks",
        ])?;
        self.send_json(Method::POST, url, &request).await
    }
}
