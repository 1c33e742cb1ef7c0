//! GitHub REST client for the github-mcp server
//!
//! This crate is the upstream side of the server: one async call per exposed
//! operation, behind the [`GitHubApi`] trait so the dispatch layer never sees
//! HTTP details.
//!
//! ```text
//! [ github-mcp dispatcher ]
//!        | (typed requests)
//!        v
//! [ GitHubApi ] --(HttpClient)--> [ api.github.com ]
//! ```
//!
//! Retries, pagination and rate limiting are not handled here; a failed call
//! surfaces as an [`UpstreamError`] carrying the original cause.

pub mod api;
pub mod error;
pub mod http;
pub mod requests;

pub use api::GitHubApi;
pub use error::{Result, UpstreamError};
pub use http::{HttpClient, HttpClientConfig, DEFAULT_API_URL};
pub use requests::{
    CreateIssue, CreateOrUpdateFile, CreatePullRequest, CreateRepository, ForkRepository,
    GetFileContents,
};
