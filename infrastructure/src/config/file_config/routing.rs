//! Routing configuration from TOML (`[routing]` section)

use super::ConfigValidationError;
use factlink_domain::{FactScope, RouteOptions};
use serde::{Deserialize, Serialize};

/// Raw routing configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoutingConfig {
    /// `facts` or `properties`
    pub default_scope: Option<String>,
    /// Forwarded to the discovery tool as `dimensionHint`
    pub dimension_hint: Option<u64>,
}

impl FileRoutingConfig {
    pub fn to_route_options(&self) -> Result<RouteOptions, ConfigValidationError> {
        let mut options = RouteOptions::default();
        if let Some(scope) = &self.default_scope {
            let parsed: FactScope = scope
                .parse()
                .map_err(|_| ConfigValidationError::UnknownScope(scope.clone()))?;
            options = options.with_scope(parsed);
        }
        if let Some(hint) = self.dimension_hint {
            options = options.with_dimension_hint(hint);
        }
        Ok(options)
    }
}
