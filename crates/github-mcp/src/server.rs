//! MCP Server implementation
//!
//! The main server struct that coordinates MCP protocol handling
//! with the tool dispatcher.

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::Result;
use crate::dispatch::Dispatcher;
use crate::protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION,
    ServerCapabilities, ServerInfo, ToolCallParams, ToolsCapability,
};
use crate::tools::{ToolDefinition, get_tool_definitions};

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "github-mcp-server";

/// MCP Server for GitHub operations
///
/// Cheap to clone: every clone shares the same [`Dispatcher`]. Each incoming
/// line is handled on its own task, so a slow GitHub call does not hold up
/// the requests behind it.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use github_mcp::{Dispatcher, GitHubMcpServer, OperationTable};
///
/// let dispatcher = Dispatcher::new(OperationTable::new(), Arc::new(client));
/// GitHubMcpServer::new(dispatcher).run().await?;
/// ```
#[derive(Clone)]
pub struct GitHubMcpServer {
    dispatcher: Arc<Dispatcher>,
}

impl GitHubMcpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Tools advertised by `tools/list`
    pub fn tools(&self) -> Vec<ToolDefinition> {
        get_tool_definitions(self.dispatcher.table())
    }

    /// Serve MCP over stdin/stdout until stdin closes.
    pub async fn run(&self) -> Result<()> {
        tracing::info!("MCP server ready, listening on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await?;
        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Serve newline-delimited JSON-RPC from `reader` to `writer`.
    ///
    /// Responses go through a single writer task so lines never interleave;
    /// they may leave in a different order than the requests arrived. Returns
    /// once `reader` is exhausted and every in-flight request has answered.
    /// If writing fails, no further requests are read and the write error is
    /// returned after in-flight requests finish.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let mut writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(line) = rx.recv().await {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        });

        let mut lines = BufReader::new(reader).lines();
        let mut in_flight = JoinSet::new();
        let mut writer_result = None;

        loop {
            // The writer only finishes early when output has failed.
            let next = tokio::select! {
                next = lines.next_line() => next?,
                joined = &mut writer_task => {
                    tracing::error!("Response writer stopped, no longer reading requests");
                    writer_result = Some(joined);
                    break;
                }
            };
            let Some(line) = next else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            tracing::debug!(request = %line, "Received message");

            let server = self.clone();
            let tx = tx.clone();
            in_flight.spawn(async move {
                if let Some(response) = server.handle_message(&line).await {
                    if tx.send(response).is_err() {
                        tracing::warn!("Dropping response, writer has stopped");
                    }
                }
            });

            while in_flight.try_join_next().is_some() {}
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Request task failed");
            }
        }

        drop(tx);
        let joined = match writer_result {
            Some(joined) => joined,
            None => writer_task.await,
        };
        joined??;
        Ok(())
    }

    /// Handle a single MCP message
    ///
    /// Returns the encoded JSON-RPC response, or `None` for notifications.
    pub async fn handle_message(&self, message: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(message) {
            Err(e) => Some(JsonRpcResponse::error(
                None,
                PARSE_ERROR,
                format!("Parse error: {e}"),
            )),
            Ok(value) => {
                let id = value.get("id").filter(|id| !id.is_null()).cloned();
                match serde_json::from_value::<JsonRpcRequest>(value) {
                    Ok(request) => self.handle_request(request).await,
                    Err(e) => Some(JsonRpcResponse::error(
                        id,
                        INVALID_REQUEST,
                        format!("Invalid Request: {e}"),
                    )),
                }
            }
        };

        response.and_then(|r| encode(&r))
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            tracing::debug!(method = %request.method, "Received notification");
            return None;
        };
        let id = Some(id);

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }

    /// Handle the initialize request
    ///
    /// Returns server capabilities and info.
    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        to_success(id, &result)
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": self.tools() }))
    }

    /// Handle tools/call request
    ///
    /// Dispatch failures become JSON-RPC errors carrying the failure kind.
    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> JsonRpcResponse {
        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}"));
            }
        };

        match self.dispatcher.dispatch(&params.name, params.arguments).await {
            Ok(result) => to_success(id, &result),
            Err(e) => JsonRpcResponse::failure(id, JsonRpcError::from(&e)),
        }
    }
}

fn to_success<T: serde::Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Internal error: {e}")),
    }
}

fn encode(response: &JsonRpcResponse) -> Option<String> {
    serde_json::to_string(response)
        .inspect_err(|e| tracing::error!(error = %e, "Failed to encode response"))
        .ok()
}
