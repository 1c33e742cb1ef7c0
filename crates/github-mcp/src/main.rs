//! GitHub MCP Server
//!
//! A Model Context Protocol server that lets agents create repositories,
//! issues, pull requests and forks, and read or write files on GitHub.
//!
//! # Usage
//!
//! ```bash
//! GITHUB_PERSONAL_ACCESS_TOKEN=ghp_... github-mcp [--config github-mcp.toml]
//! ```
//!
//! # Environment Variables
//!
//! - `GITHUB_PERSONAL_ACCESS_TOKEN`: Required. The server refuses to start without it
//! - `GITHUB_API_URL`: API base URL (default: `https://api.github.com`)
//! - `GITHUB_TIMEOUT_SECS`: Per-request timeout (default: 30)
//! - `GITHUB_MCP_CONFIG`: Path to a TOML settings file
//! - `RUST_LOG`: Control log verbosity (default: `github_mcp=info`)
//!
//! # Protocol
//!
//! The server communicates via JSON-RPC 2.0 over stdio:
//! - Requests/responses go through stdout
//! - Logs go to stderr (to avoid interfering with the protocol)

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use github_api::HttpClient;
use github_mcp::{Config, Dispatcher, GitHubMcpServer, OperationTable, Overrides};
use tracing_subscriber::EnvFilter;

/// MCP server for GitHub
#[derive(Parser)]
#[command(name = "github-mcp")]
#[command(about = "MCP server exposing GitHub repository operations")]
#[command(version)]
struct Args {
    /// GitHub personal access token
    #[arg(long, env = "GITHUB_PERSONAL_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "GITHUB_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// TOML settings file
    #[arg(short, long, env = "GITHUB_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

impl From<Args> for Overrides {
    fn from(args: Args) -> Self {
        Self {
            token: args.token,
            api_url: args.api_url,
            timeout_secs: args.timeout_secs,
            config_path: args.config,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging to stderr (stdout is reserved for MCP protocol)
    let default_directive = if args.verbose {
        "github_mcp=debug,github_api=debug"
    } else {
        "github_mcp=info,github_api=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args.into()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "github-mcp failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(overrides: Overrides) -> github_mcp::Result<()> {
    let config = Config::resolve(overrides)?;
    tracing::info!(
        api_url = %config.api_url,
        timeout_secs = config.timeout.as_secs(),
        "Starting github-mcp server"
    );

    let client = HttpClient::new(config.http_client_config())?;
    let dispatcher = Dispatcher::new(OperationTable::new(), Arc::new(client));

    GitHubMcpServer::new(dispatcher).run().await
}
