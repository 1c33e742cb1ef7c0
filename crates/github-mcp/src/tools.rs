//! MCP tool surface
//!
//! This module turns the [`OperationTable`] into what MCP clients see: tool
//! definitions for `tools/list` and the result envelope for `tools/call`.
//!
//! # Tools
//!
//! - `create_or_update_file` - Create or update a single file (content is base64 encoded upstream)
//! - `create_repository` - Create a repository in the authenticated account
//! - `get_file_contents` - Read a file or list a directory
//! - `create_issue` - Open an issue
//! - `create_pull_request` - Open a pull request
//! - `fork_repository` - Fork into the account or an organization

use serde::{Deserialize, Serialize};

use crate::operations::OperationTable;

/// Tool definition for MCP protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Result from a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
}

/// Content types for tool results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: content.into(),
            }],
        }
    }

    /// Pretty-print `body` (two-space indent) as a single text entry.
    pub fn json(body: &serde_json::Value) -> Self {
        let text = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
        Self::text(text)
    }
}

/// Every tool in the table, in declaration order
pub fn get_tool_definitions(table: &OperationTable) -> Vec<ToolDefinition> {
    table
        .iter()
        .map(|operation| ToolDefinition {
            name: operation.name.to_string(),
            description: operation.description.to_string(),
            input_schema: operation.schema.to_json_schema(),
        })
        .collect()
}
