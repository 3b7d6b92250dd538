//! Tool invocation entities

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A call to a remote tool with arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: Map::new(),
        }
    }

    pub fn with_arguments(mut self, arguments: Map<String, Value>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a bool argument, defaulting to false
    pub fn get_bool(&self, key: &str) -> bool {
        self.arguments
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_call_builder() {
        let call = ToolCall::new("wikidata.get_entity_claims")
            .with_arg("entityId", "Q34743")
            .with_arg("optional", true);

        assert_eq!(call.tool_name, "wikidata.get_entity_claims");
        assert_eq!(call.get_string("entityId"), Some("Q34743"));
        assert!(call.get_bool("optional"));
        assert!(!call.get_bool("missing"));
    }
}
