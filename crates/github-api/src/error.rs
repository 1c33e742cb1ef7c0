//! Error types for github-api

use serde_json::Value;

/// Result type for upstream calls
pub type Result<T> = std::result::Result<T, UpstreamError>;

/// Errors raised by the upstream GitHub API or the transport in front of it
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The request never produced a response (DNS, TLS, timeout, reset, ...)
    #[error("request to GitHub failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// GitHub answered with a non-success status
    #[error("GitHub API returned {status}: {message}")]
    Status {
        status: u16,
        message: String,
        body: Value,
    },

    /// The configured API base URL cannot carry request paths
    #[error("invalid GitHub API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl UpstreamError {
    /// HTTP status of the upstream reply, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidUrl { .. } => None,
        }
    }

    /// Parsed body of the upstream reply, if there was one
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}
