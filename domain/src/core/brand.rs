//! Provenance branding shared by every routed call and planned step.
//!
//! Every parameter map this crate produces carries [`PROVENANCE_KEY`] set to
//! [`BRAND_TAG`], so remote logs and audit trails can attribute a call back
//! to factlink regardless of which connector served it.

/// Brand tag embedded in routing and plan parameters.
pub const BRAND_TAG: &str = "factlink";

/// Parameter key under which [`BRAND_TAG`] is stored.
pub const PROVENANCE_KEY: &str = "provenance";

/// Parameter key carrying the connector id for traceability.
pub const CONNECTOR_KEY: &str = "connectorId";

/// Reserved tool identifier meaning "do not call a remote tool; inspect
/// what the connector offers instead".
pub const INSPECT_CAPABILITIES_TOOL: &str = "factlink.inspect_capabilities";

/// Prefix prepended to user-visible error explanations.
pub fn branded(message: impl AsRef<str>) -> String {
    format!("[{}] {}", BRAND_TAG, message.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branded_prefix() {
        assert_eq!(branded("no tools"), "[factlink] no tools");
    }

    #[test]
    fn test_inspect_tool_is_namespaced_under_brand() {
        assert!(INSPECT_CAPABILITIES_TOOL.starts_with(BRAND_TAG));
    }
}
