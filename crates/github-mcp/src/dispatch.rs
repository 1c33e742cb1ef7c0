//! Tool call dispatch
//!
//! [`Dispatcher::dispatch`] runs one `tools/call` end to end: argument
//! presence, name lookup, schema validation, the upstream call, and wrapping
//! the raw response in a [`ToolResult`]. Each step must succeed before the
//! next runs, so an unknown name never reaches validation and an invalid
//! payload never reaches GitHub.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64;
use github_api::{CreateOrUpdateFile, GitHubApi, UpstreamError};
use serde_json::{Value, json};
use tracing::Instrument;

use crate::operations::{OperationKind, OperationTable};
use crate::schema::{Arguments, ValidationError};
use crate::tools::ToolResult;

/// Why a tool call failed
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// `tools/call` carried no `arguments` at all
    #[error("arguments are required")]
    MissingArguments,

    /// No tool with this name
    #[error("unknown tool: {0}")]
    UnknownOperation(String),

    /// The arguments do not match the tool's schema
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// GitHub (or the connection to it) rejected the call
    #[error("GitHub request failed: {0}")]
    Upstream(#[from] UpstreamError),
}

impl DispatchError {
    /// Stable machine-readable name, used as `error.data.kind`
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingArguments => "missing_arguments",
            Self::UnknownOperation(_) => "unknown_operation",
            Self::Validation(_) => "validation_error",
            Self::Upstream(_) => "upstream_error",
        }
    }

    /// Structured detail for the JSON-RPC error `data` member
    pub fn data(&self) -> Value {
        match self {
            Self::MissingArguments => json!({ "kind": self.kind() }),
            Self::UnknownOperation(name) => json!({ "kind": self.kind(), "tool": name }),
            Self::Validation(e) => json!({ "kind": self.kind(), "violations": e.violations() }),
            Self::Upstream(e) => {
                let mut data = json!({ "kind": self.kind() });
                if let Some(status) = e.status() {
                    data["status"] = json!(status);
                }
                if let Some(body) = e.body() {
                    data["body"] = body.clone();
                }
                data
            }
        }
    }
}

/// Validates and executes tool calls against the upstream API.
///
/// Holds only immutable state, so one instance behind an `Arc` serves every
/// concurrent call.
pub struct Dispatcher {
    table: OperationTable,
    api: Arc<dyn GitHubApi>,
}

impl Dispatcher {
    pub fn new(table: OperationTable, api: Arc<dyn GitHubApi>) -> Self {
        Self { table, api }
    }

    pub fn table(&self) -> &OperationTable {
        &self.table
    }

    /// Run one tool call.
    ///
    /// `arguments` of `None` or JSON `null` count as absent.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolResult, DispatchError> {
        tracing::debug!(tool = name, "Dispatching tool call");

        let arguments = match arguments {
            None | Some(Value::Null) => return Err(DispatchError::MissingArguments),
            Some(arguments) => arguments,
        };

        let operation = self
            .table
            .get(name)
            .ok_or_else(|| DispatchError::UnknownOperation(name.to_string()))?;

        let validated = operation.schema.validate(&arguments).inspect_err(|e| {
            tracing::warn!(tool = name, error = %e, "Rejected tool arguments");
        })?;

        let span = tracing::info_span!("upstream_call", tool = operation.name);
        let body = self
            .invoke(operation.kind, validated)
            .instrument(span)
            .await
            .inspect_err(|e| {
                tracing::error!(tool = name, error = %e, "Tool call failed");
            })?;

        Ok(ToolResult::json(&body))
    }

    /// Shape validated arguments into the upstream request and send it.
    async fn invoke(&self, kind: OperationKind, args: Arguments) -> Result<Value, DispatchError> {
        let body = match kind {
            OperationKind::CreateRepository => {
                self.api.create_repository(args.deserialize()?).await?
            }
            OperationKind::CreateIssue => self.api.create_issue(args.deserialize()?).await?,
            OperationKind::CreateOrUpdateFile => {
                let request = encode_content(args.deserialize()?);
                self.api.create_or_update_file(request).await?
            }
            OperationKind::GetFileContents => {
                self.api.get_file_contents(args.deserialize()?).await?
            }
            OperationKind::CreatePullRequest => {
                self.api.create_pull_request(args.deserialize()?).await?
            }
            OperationKind::ForkRepository => self.api.fork_repository(args.deserialize()?).await?,
        };
        Ok(body)
    }
}

/// GitHub's contents API takes file bodies as base64.
fn encode_content(mut request: CreateOrUpdateFile) -> CreateOrUpdateFile {
    request.content = Base64.encode(request.content.as_bytes());
    request
}
