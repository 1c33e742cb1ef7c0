//! MCP Server for GitHub
//!
//! This crate exposes a fixed set of GitHub repository operations via the
//! Model Context Protocol (MCP). An agent discovers the tools with
//! `tools/list` and invokes them by name with `tools/call`; it never sees the
//! GitHub REST API itself.
//!
//! # Architecture
//!
//! ```text
//! [ MCP Client (agent/IDE) ]
//!        | (JSON-RPC over stdio)
//!        v
//! [ server ] --tools/list--> [ tools ] ----+
//!        |                                 |
//!        +--tools/call--> [ dispatch ] ----+--> [ operations + schema ]
//!                              |
//!                              v
//!                     [ github-api (HTTP) ]
//! ```
//!
//! The operation table is built once at startup and only read afterwards.
//! Each tool call validates its arguments against the operation's schema
//! before exactly one upstream request is made.
//!
//! # Tools
//!
//! - `create_repository`, `fork_repository`
//! - `create_issue`, `create_pull_request`
//! - `create_or_update_file`, `get_file_contents`

pub mod config;
pub mod dispatch;
pub mod error;
pub mod operations;
pub mod protocol;
pub mod schema;
pub mod server;
pub mod tools;

pub use config::{Config, Overrides, SettingsFile};
pub use dispatch::{DispatchError, Dispatcher};
pub use error::{Error, Result};
pub use operations::{OPERATIONS, Operation, OperationKind, OperationTable};
pub use schema::{Arguments, Constraint, FieldViolation, Schema, ValidationError};
pub use server::GitHubMcpServer;
pub use tools::{ToolContent, ToolDefinition, ToolResult, get_tool_definitions};
