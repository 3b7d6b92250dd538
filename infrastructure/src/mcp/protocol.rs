//! JSON-RPC protocol types for MCP communication.
//!
//! - **Requests**: client → server (`initialize`, `tools/list`, `tools/call`)
//! - **Responses**: server → client (result or error), correlated by `id`
//! - **Notifications**: either direction, no `id`

use super::error::{McpError, Result};
use factlink_domain::RemoteTool;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MCP protocol revision sent in `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC notification (no `id`, no response)
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: &'static str,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            Some(err) => Err(McpError::RpcError {
                code: err.code,
                message: err.message,
            }),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// An MCP tool definition returned by `tools/list`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpToolInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Value,
}

impl McpToolInfo {
    /// The server's view of a tool, as a declared remote tool.
    pub fn to_remote_tool(&self) -> RemoteTool {
        let tool = RemoteTool::new(self.name.clone());
        match &self.description {
            Some(description) => tool.with_description(description.clone()),
            None => tool,
        }
    }
}

/// The result of calling an MCP tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpCallToolResult {
    #[serde(default)]
    pub content: Vec<McpContent>,
    #[serde(default)]
    pub structured_content: Option<Value>,
    #[serde(default)]
    pub is_error: Option<bool>,
}

/// A content block in an MCP tool result.
#[derive(Debug, Clone, Deserialize)]
pub struct McpContent {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl McpCallToolResult {
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Convert to the structured value the executor reads.
    ///
    /// Prefers `structuredContent`; otherwise the text blocks are parsed as
    /// JSON, falling back to a plain string. `isError` results become
    /// [`McpError::ToolError`].
    pub fn into_value(self) -> Result<Value> {
        if self.is_error.unwrap_or(false) {
            return Err(McpError::ToolError(self.text()));
        }
        if let Some(structured) = self.structured_content {
            return Ok(structured);
        }
        let text = self.text();
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_compact() {
        let req = JsonRpcRequest::new(7, "tools/list", None);
        let s = serde_json::to_string(&req).unwrap();
        assert_eq!(s, r#"{"jsonrpc":"2.0","id":7,"method":"tools/list"}"#);
    }

    #[test]
    fn test_tool_info_deserializes() {
        let json = r#"{"name": "search_items", "description": "Search", "inputSchema": {"type": "object"}}"#;
        let tool: McpToolInfo = serde_json::from_str(json).unwrap();
        assert_eq!(tool.name, "search_items");
        assert_eq!(
            tool.to_remote_tool().description.as_deref(),
            Some("Search")
        );
    }

    #[test]
    fn test_text_content_parsed_as_json() {
        let result: McpCallToolResult = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "{\"results\": [{\"id\": \"Q1\"}]}"}],
            "isError": false
        }))
        .unwrap();
        assert_eq!(result.into_value().unwrap()["results"][0]["id"], "Q1");
    }

    #[test]
    fn test_plain_text_kept_as_string() {
        let result: McpCallToolResult = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "no structure here"}]
        }))
        .unwrap();
        assert_eq!(result.into_value().unwrap(), json!("no structure here"));
    }

    #[test]
    fn test_structured_content_preferred() {
        let result: McpCallToolResult = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "ignored"}],
            "structuredContent": {"count": 3}
        }))
        .unwrap();
        assert_eq!(result.into_value().unwrap()["count"], 3);
    }

    #[test]
    fn test_is_error_becomes_tool_error() {
        let result: McpCallToolResult = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "rate limited"}],
            "isError": true
        }))
        .unwrap();
        assert!(matches!(result.into_value(), Err(McpError::ToolError(m)) if m == "rate limited"));
    }

    #[test]
    fn test_rpc_error_response() {
        let resp: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0", "id": 3, "error": {"code": -32601, "message": "Method not found"}
        }))
        .unwrap();
        assert!(matches!(
            resp.into_result(),
            Err(McpError::RpcError { code: -32601, .. })
        ));
    }
}
