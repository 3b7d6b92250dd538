//! MCP client over a child process's stdio.

use super::error::{McpError, Result};
use super::protocol::{
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, McpCallToolResult, McpToolInfo,
    PROTOCOL_VERSION,
};
use async_trait::async_trait;
use factlink_application::ToolTransport;
use factlink_domain::{RemoteTool, TransportError};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, trace};

/// A connected MCP server, usable as a [`ToolTransport`].
pub struct McpStdioTransport {
    child: Mutex<Child>,
    stdin: Mutex<ChildStdin>,
    stdout: Mutex<BufReader<ChildStdout>>,
    next_id: AtomicU64,
    server_name: String,
}

impl McpStdioTransport {
    /// Spawn an MCP server and complete the `initialize` handshake.
    pub async fn connect(
        name: &str,
        command: &str,
        args: &[String],
        env: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut cmd = Command::new(command);
        cmd.args(args)
            .envs(env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| McpError::SpawnError {
            server: name.to_string(),
            source,
        })?;
        let stdin = child.stdin.take().ok_or(McpError::MissingPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(McpError::MissingPipe("stdout"))?;

        let transport = Self {
            child: Mutex::new(child),
            stdin: Mutex::new(stdin),
            stdout: Mutex::new(BufReader::new(stdout)),
            next_id: AtomicU64::new(1),
            server_name: name.to_string(),
        };

        let init = transport
            .request(
                "initialize",
                Some(json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": "factlink",
                        "version": env!("CARGO_PKG_VERSION"),
                    }
                })),
            )
            .await?;
        info!(server = name, info = %init, "Connected to MCP server");

        transport.notify("notifications/initialized", None).await?;

        Ok(transport)
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    async fn write_line(&self, message: &impl Serialize) -> Result<()> {
        let mut payload = serde_json::to_string(message)?;
        trace!(payload = %payload, "-> mcp");
        payload.push('\n');

        let mut stdin = self.stdin.lock().await;
        stdin.write_all(payload.as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Send a request and wait for the response carrying its id.
    ///
    /// The stdout lock is held for the whole exchange, so requests are
    /// serialized; frames with other ids and notifications are skipped.
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest::new(id, method, params);

        let mut stdout = self.stdout.lock().await;
        self.write_line(&request).await?;

        let mut line = String::new();
        loop {
            line.clear();
            if stdout.read_line(&mut line).await? == 0 {
                return Err(McpError::TransportClosed);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            trace!(frame = %trimmed, "<- mcp");

            match serde_json::from_str::<JsonRpcResponse>(trimmed) {
                Ok(response) if response.id == Some(id) => return response.into_result(),
                Ok(_) => debug!(method, "Skipping unrelated MCP frame"),
                Err(_) => debug!(method, "Skipping non-response MCP output"),
            }
        }
    }

    async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        self.write_line(&JsonRpcNotification::new(method, params))
            .await
    }

    /// Discover the tools the server exposes.
    pub async fn list_tools(&self) -> Result<Vec<McpToolInfo>> {
        let result = self.request("tools/list", None).await?;
        let tools = result.get("tools").cloned().unwrap_or(Value::Array(vec![]));
        Ok(serde_json::from_value(tools)?)
    }

    /// Discovered tools as declared remote tools.
    pub async fn remote_tools(&self) -> Result<Vec<RemoteTool>> {
        Ok(self
            .list_tools()
            .await?
            .iter()
            .map(McpToolInfo::to_remote_tool)
            .collect())
    }

    /// Invoke a tool and return the raw MCP result.
    pub async fn call(&self, name: &str, arguments: &Map<String, Value>) -> Result<McpCallToolResult> {
        let params = json!({ "name": name, "arguments": arguments });
        let result = self.request("tools/call", Some(params)).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Kill the server process.
    pub async fn shutdown(&self) -> Result<()> {
        let mut child = self.child.lock().await;
        child.kill().await?;
        Ok(())
    }
}

#[async_trait]
impl ToolTransport for McpStdioTransport {
    async fn call_tool(
        &self,
        name: &str,
        args: &Map<String, Value>,
    ) -> std::result::Result<Value, TransportError> {
        debug!(server = %self.server_name, tool = name, "MCP tools/call");
        let result = self.call(name, args).await?;
        Ok(result.into_value()?)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use factlink_domain::TransportErrorKind;

    /// Answers `initialize` (id 1), then one scripted reply per later request.
    const FAKE_SERVER: &str = r#"
while IFS= read -r line; do
  case "$line" in
    *'"method":"initialize"'*)
      printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{"serverInfo":{"name":"fake"}}}' ;;
    *'"method":"tools/list"'*)
      printf '%s\n' '{"jsonrpc":"2.0","method":"notifications/progress","params":{}}'
      printf '%s\n' '{"jsonrpc":"2.0","id":2,"result":{"tools":[{"name":"search_items","description":"Search"}]}}' ;;
    *'"name":"fails"'*)
      printf '%s\n' '{"jsonrpc":"2.0","id":3,"result":{"content":[{"type":"text","text":"boom"}],"isError":true}}' ;;
    *'"method":"tools/call"'*)
      printf '%s\n' '{"jsonrpc":"2.0","id":3,"result":{"structuredContent":{"results":[{"id":"Q1"}]}}}' ;;
  esac
done
"#;

    async fn fake_server() -> McpStdioTransport {
        McpStdioTransport::connect(
            "fake",
            "sh",
            &["-c".to_string(), FAKE_SERVER.to_string()],
            &BTreeMap::new(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_tools_skips_notifications() {
        let transport = fake_server().await;
        let tools = transport.remote_tools().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "search_items");
    }

    #[tokio::test]
    async fn test_call_tool_returns_structured_content() {
        let transport = fake_server().await;
        // Consume id 2 so the call gets id 3
        transport.list_tools().await.unwrap();

        let value = transport.call_tool("search_items", &Map::new()).await.unwrap();
        assert_eq!(value["results"][0]["id"], "Q1");
    }

    #[tokio::test]
    async fn test_tool_error_is_remote_rejection() {
        let transport = fake_server().await;
        transport.list_tools().await.unwrap();

        let err = transport.call_tool("fails", &Map::new()).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::RemoteRejection);
        assert!(err.message.contains("boom"));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_reported() {
        let result = McpStdioTransport::connect(
            "missing",
            "/nonexistent/factlink-mcp-server",
            &[],
            &BTreeMap::new(),
        )
        .await;
        assert!(matches!(result, Err(McpError::SpawnError { .. })));
    }
}
