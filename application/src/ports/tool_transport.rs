//! Tool transport port
//!
//! Defines the interface for invoking a named remote tool with structured
//! arguments. The executor never cares how the call travels: an MCP child
//! process, a scripted fixture and the call-tracking double all sit behind
//! this trait.

use async_trait::async_trait;
use factlink_domain::tool::{ToolCall, TransportError};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Port for remote tool invocation
///
/// Implementations (adapters) live in the infrastructure layer, except for
/// the call-tracking double in [`crate::testing`].
#[async_trait]
pub trait ToolTransport: Send + Sync {
    /// Invoke `name` with `args` and return the raw JSON response.
    async fn call_tool(&self, name: &str, args: &Map<String, Value>)
    -> Result<Value, TransportError>;

    /// Invoke a prepared [`ToolCall`].
    async fn call(&self, call: &ToolCall) -> Result<Value, TransportError> {
        self.call_tool(&call.tool_name, &call.arguments).await
    }
}

#[async_trait]
impl<T: ToolTransport + ?Sized> ToolTransport for Arc<T> {
    async fn call_tool(
        &self,
        name: &str,
        args: &Map<String, Value>,
    ) -> Result<Value, TransportError> {
        (**self).call_tool(name, args).await
    }
}
