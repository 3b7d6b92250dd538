//! Execution configuration from TOML (`[execution]` section)

use factlink_application::ExecutionParams;
use factlink_application::config::execution_params::DEFAULT_TIMEOUT;
use factlink_domain::workflow::embedding::DEFAULT_PLACEHOLDER_DIMENSIONS;
use serde::{Deserialize, Serialize};

/// Raw execution configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    /// Timeout for each remote tool call, in milliseconds
    pub timeout_ms: u64,
    /// Attempt the optional enrichment step
    pub enable_enrichment: bool,
    /// Placeholder query vector length when nothing else names one
    pub placeholder_dimensions: usize,
}

impl Default for FileExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            enable_enrichment: true,
            placeholder_dimensions: DEFAULT_PLACEHOLDER_DIMENSIONS,
        }
    }
}

impl FileExecutionConfig {
    pub fn to_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_timeout_ms(self.timeout_ms)
            .with_enrichment(self.enable_enrichment)
            .with_placeholder_dimensions(self.placeholder_dimensions)
    }
}
