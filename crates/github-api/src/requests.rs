//! Typed request bodies, one per upstream call
//!
//! Each struct deserializes from the validated tool arguments and serializes
//! to the JSON body GitHub expects. Fields that end up in the URL (`owner`,
//! `repo`, `path`, `branch` for reads) are skipped on serialization.

use serde::{Deserialize, Serialize};

/// `POST /user/repos`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRepository {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(default, alias = "autoInit", skip_serializing_if = "Option::is_none")]
    pub auto_init: Option<bool>,
}

/// `POST /repos/{owner}/{repo}/issues`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIssue {
    #[serde(skip_serializing)]
    pub owner: String,
    #[serde(skip_serializing)]
    pub repo: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

/// `PUT /repos/{owner}/{repo}/contents/{path}`
///
/// `content` must already be base64 encoded when this reaches the client.
/// Updating an existing file requires the blob `sha` of the current version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrUpdateFile {
    #[serde(skip_serializing)]
    pub owner: String,
    #[serde(skip_serializing)]
    pub repo: String,
    #[serde(skip_serializing)]
    pub path: String,
    pub message: String,
    pub content: String,
    pub branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// `GET /repos/{owner}/{repo}/contents/{path}?ref={branch}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetFileContents {
    pub owner: String,
    pub repo: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// `POST /repos/{owner}/{repo}/pulls`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePullRequest {
    #[serde(skip_serializing)]
    pub owner: String,
    #[serde(skip_serializing)]
    pub repo: String,
    pub title: String,
    pub head: String,
    pub base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer_can_modify: Option<bool>,
}

/// `POST /repos/{owner}/{repo}/forks`
///
/// Without an organization the fork lands in the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkRepository {
    #[serde(skip_serializing)]
    pub owner: String,
    #[serde(skip_serializing)]
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}
