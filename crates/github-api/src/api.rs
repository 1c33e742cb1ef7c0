//! The [`GitHubApi`] trait

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;
use crate::requests::{
    CreateIssue, CreateOrUpdateFile, CreatePullRequest, CreateRepository, ForkRepository,
    GetFileContents,
};

/// One async call per operation the server exposes.
///
/// Every method returns the raw response body as JSON so the caller can hand
/// it back verbatim. Implementations must be shareable across concurrent
/// dispatches.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    async fn create_repository(&self, request: CreateRepository) -> Result<Value>;

    async fn create_issue(&self, request: CreateIssue) -> Result<Value>;

    async fn create_or_update_file(&self, request: CreateOrUpdateFile) -> Result<Value>;

    /// Returns either a single file object or a directory listing array
    async fn get_file_contents(&self, request: GetFileContents) -> Result<Value>;

    async fn create_pull_request(&self, request: CreatePullRequest) -> Result<Value>;

    async fn fork_repository(&self, request: ForkRepository) -> Result<Value>;
}
