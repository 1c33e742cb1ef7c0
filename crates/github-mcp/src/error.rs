//! Error types for the MCP server
//!
//! Tool call failures are [`crate::DispatchError`]s and go back to the
//! client. The errors here stop the process.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while starting or running the server
#[derive(Debug, Error)]
pub enum Error {
    /// No GitHub token was supplied
    #[error("GITHUB_PERSONAL_ACCESS_TOKEN environment variable is not set")]
    MissingCredential,

    /// Settings file could not be read
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Settings file is not valid TOML or has unknown keys
    #[error("invalid config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A setting has an unusable value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be built
    #[error("GitHub client error: {0}")]
    Client(#[from] github_api::UpstreamError),

    /// IO error on the stdio transport
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The output writer task panicked or was cancelled
    #[error("writer task failed: {0}")]
    Writer(#[from] tokio::task::JoinError),
}
