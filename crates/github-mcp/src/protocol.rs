//! MCP Protocol message types
//!
//! JSON-RPC 2.0 message structures for MCP communication.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dispatch::DispatchError;

/// Protocol revision this server speaks
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC 2.0 Request
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self::failure(
            id,
            JsonRpcError {
                code,
                message,
                data: None,
            },
        )
    }

    pub fn failure(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<&DispatchError> for JsonRpcError {
    fn from(err: &DispatchError) -> Self {
        let code = match err {
            DispatchError::MissingArguments
            | DispatchError::UnknownOperation(_)
            | DispatchError::Validation(_) => INVALID_PARAMS,
            DispatchError::Upstream(_) => INTERNAL_ERROR,
        };
        Self {
            code,
            message: err.to_string(),
            data: Some(err.data()),
        }
    }
}

/// Initialize response result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    pub list_changed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Tool call params
///
/// `arguments` stays `None` both when the key is missing and when it is
/// `null`; the dispatcher rejects either.
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_serialize() {
        let response =
            JsonRpcResponse::success(Some(Value::Number(1.into())), json!({"ok": true}));
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("result"));
        assert!(!json.contains("error"));
    }

    #[test]
    fn test_error_response_serialize() {
        let response = JsonRpcResponse::error(
            Some(Value::Number(1.into())),
            INVALID_REQUEST,
            "Invalid Request".to_string(),
        );
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("-32600"));
        assert!(!json.contains("data"));
    }

    #[test]
    fn test_error_response_keeps_null_id() {
        let response = JsonRpcResponse::error(None, PARSE_ERROR, "Parse error".to_string());
        let json: Value = serde_json::to_value(&response).unwrap();
        assert!(json.get("id").is_some());
        assert!(json["id"].is_null());
    }

    #[test]
    fn test_jsonrpc_request_with_string_id() {
        let json = r#"{
            "jsonrpc": "2.0",
            "id": "abc-123",
            "method": "tools/list",
            "params": {}
        }"#;
        let request: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.id, Some(Value::String("abc-123".to_string())));
        assert_eq!(request.method, "tools/list");
    }

    #[test]
    fn test_jsonrpc_request_without_id_is_notification() {
        let json = r#"{
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }"#;
        let request: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert!(request.id.is_none());
        assert_eq!(request.method, "notifications/initialized");
    }

    #[test]
    fn test_jsonrpc_request_without_params() {
        let json = r#"{"jsonrpc": "2.0", "id": 1, "method": "tools/list"}"#;
        let request: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.params, Value::Null);
    }

    #[test]
    fn test_initialize_result_serialize() {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: "github-mcp-server".to_string(),
                version: "0.1.0".to_string(),
            },
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("protocolVersion"));
        assert!(json.contains("2024-11-05"));
        assert!(json.contains("github-mcp-server"));
        assert!(json.contains("serverInfo"));
        assert!(json.contains("listChanged"));
    }

    #[test]
    fn test_tool_call_params_deserialize() {
        let json = r#"{
            "name": "create_issue",
            "arguments": {"owner": "octo", "repo": "hello", "title": "Bug"}
        }"#;
        let params: ToolCallParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.name, "create_issue");
        assert_eq!(params.arguments.unwrap()["title"], "Bug");
    }

    #[test]
    fn test_tool_call_params_without_arguments() {
        let params: ToolCallParams = serde_json::from_str(r#"{"name": "create_issue"}"#).unwrap();
        assert!(params.arguments.is_none());

        let params: ToolCallParams =
            serde_json::from_str(r#"{"name": "create_issue", "arguments": null}"#).unwrap();
        assert!(params.arguments.is_none());
    }

    #[test]
    fn test_dispatch_error_codes() {
        let missing = JsonRpcError::from(&DispatchError::MissingArguments);
        assert_eq!(missing.code, INVALID_PARAMS);
        assert_eq!(missing.data.unwrap()["kind"], "missing_arguments");

        let unknown = JsonRpcError::from(&DispatchError::UnknownOperation("nope".to_string()));
        assert_eq!(unknown.code, INVALID_PARAMS);
        assert_eq!(unknown.message, "unknown tool: nope");

        let upstream = JsonRpcError::from(&DispatchError::Upstream(
            github_api::UpstreamError::Status {
                status: 401,
                message: "Bad credentials".to_string(),
                body: json!({"message": "Bad credentials"}),
            },
        ));
        assert_eq!(upstream.code, INTERNAL_ERROR);
        assert!(upstream.message.contains("Bad credentials"));
        assert_eq!(upstream.data.unwrap()["status"], 401);
    }
}
