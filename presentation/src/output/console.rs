//! Console output formatter for factlink results

use colored::Colorize;
use factlink_domain::workflow::value_objects::metadata_keys;
use factlink_domain::{
    ConnectorEntry, ExecutionPlan, NormalizedToolName, RemoteTool, ResolvedTools, ResultSource,
    RoutingDecision, WorkflowResult,
};
use serde::Serialize;
use serde_json::{Value, json};

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format any serializable result as pretty JSON
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// JSON shape for `tools`: resolution source plus the tool list
    pub fn tools_json(connector: &ConnectorEntry, resolved: &ResolvedTools) -> Value {
        json!({
            "connectorId": connector.id,
            "source": resolved.source.as_str(),
            "tools": resolved.tools,
        })
    }

    pub fn format_connectors(connectors: &[ConnectorEntry]) -> String {
        if connectors.is_empty() {
            return format!("{}\n", "No connectors in manifest".yellow());
        }
        let mut output = Self::section_header("Connectors");
        for connector in connectors {
            let declared = connector.remote_tools.as_ref().map_or(0, Vec::len);
            output.push_str(&format!(
                "  {} {} {}\n",
                connector.id.bold(),
                connector.display_name,
                format!("({} declared tools)", declared).dimmed()
            ));
        }
        output
    }

    pub fn format_tools(connector: &ConnectorEntry, resolved: &ResolvedTools) -> String {
        let mut output = Self::section_header(&format!("Tools for {}", connector.id));
        output.push_str(&format!(
            "{} {}\n\n",
            "Source:".cyan().bold(),
            resolved.source.as_str()
        ));

        if resolved.tools.is_empty() {
            output.push_str(&format!("  {}\n", "(no tools resolved)".dimmed()));
            return output;
        }
        for tool in &resolved.tools {
            output.push_str(&Self::tool_line(tool));
        }
        output
    }

    /// Tools reported by a live server, with their canonical names
    pub fn format_live_tools(server: &str, tools: &[NormalizedToolName]) -> String {
        let mut output = Self::section_header(&format!("Live tools from {}", server));
        for tool in tools {
            if tool.original_name == tool.normalized_name {
                output.push_str(&format!("  {}\n", tool.normalized_name.bold()));
            } else {
                output.push_str(&format!(
                    "  {} {} {}\n",
                    tool.original_name,
                    "->".dimmed(),
                    tool.normalized_name.bold()
                ));
            }
        }
        output
    }

    pub fn format_normalized(normalized: &NormalizedToolName) -> String {
        let mut output = format!(
            "{} {} {}\n",
            normalized.original_name,
            "->".cyan(),
            normalized.normalized_name.bold()
        );
        if !normalized.tags.is_empty() {
            output.push_str(&format!("  {} {}\n", "tags:".dimmed(), normalized.tags.join(", ")));
        }
        if !normalized.scopes.is_empty() {
            output.push_str(&format!(
                "  {} {}\n",
                "scopes:".dimmed(),
                normalized.scopes.join(", ")
            ));
        }
        output
    }

    pub fn format_route(decision: &RoutingDecision) -> String {
        let mut output = match decision.fallback_reason() {
            Some(reason) => format!(
                "{} {} ({})\n",
                "Fallback:".yellow().bold(),
                decision.tool_name,
                reason
            ),
            None => format!("{} {}\n", "Tool:".cyan().bold(), decision.tool_name.bold()),
        };
        output.push_str(&Self::parameter_lines(decision.parameters.iter()));
        output
    }

    pub fn format_plan(plan: &ExecutionPlan) -> String {
        let mut output = Self::section_header("Execution Plan");
        for step in plan.steps() {
            let optional = if step.is_optional() {
                format!(" {}", "(optional)".dimmed())
            } else {
                String::new()
            };
            output.push_str(&format!(
                "{}. {} {}{}\n",
                step.order,
                step.action.as_str().yellow().bold(),
                step.target_tool,
                optional
            ));
            output.push_str(&Self::parameter_lines(step.parameters.iter()));
        }
        output
    }

    /// Format a workflow result
    pub fn format_result(result: &WorkflowResult) -> String {
        let mut output = String::new();

        let status = if let Some(error) = &result.error {
            format!("{} {}", "ERROR".red().bold(), error.message)
        } else if result.is_fallback() {
            format!("{}", "FALLBACK (local results)".yellow().bold())
        } else if result.degraded {
            format!("{}", "DEGRADED".yellow().bold())
        } else {
            format!("{}", "OK".green().bold())
        };
        output.push_str(&format!("{} {}\n", "Status:".cyan().bold(), status));

        if let Some(reason) = result.metadata_str(metadata_keys::FALLBACK_REASON) {
            output.push_str(&format!("{} {}\n", "Reason:".cyan().bold(), reason));
        }

        if !result.content.is_empty() {
            output.push_str(&Self::section_header("Answer"));
            output.push_str(&result.content);
            output.push('\n');
        }

        if !result.results.is_empty() {
            output.push_str(&Self::section_header("Results"));
            for item in &result.results {
                let marker = match item.source {
                    ResultSource::Remote => "remote".green(),
                    ResultSource::LocalFallback => "local".yellow(),
                };
                let score = item
                    .score
                    .map(|s| format!(" {:.3}", s).dimmed().to_string())
                    .unwrap_or_default();
                output.push_str(&format!(
                    "{:>3}. [{}] {} {}{}\n",
                    item.position,
                    marker,
                    item.id.bold(),
                    item.title.as_deref().unwrap_or(""),
                    score
                ));
            }
        }

        output.push_str(&Self::section_header("Metadata"));
        for (key, value) in &result.metadata {
            output.push_str(&format!("  {}: {}\n", key.dimmed(), Self::compact(value)));
        }

        output
    }

    fn tool_line(tool: &RemoteTool) -> String {
        let tags = if tool.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tool.tags.join(", ")).cyan().to_string()
        };
        let description = tool
            .description
            .as_deref()
            .map(|d| format!(" - {}", d))
            .unwrap_or_default();
        format!("  {}{}{}\n", tool.name.bold(), tags, description)
    }

    fn parameter_lines<'a>(params: impl Iterator<Item = (&'a String, &'a Value)>) -> String {
        params
            .map(|(key, value)| format!("    {}: {}\n", key.dimmed(), Self::compact(value)))
            .collect()
    }

    fn compact(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factlink_domain::{
        RankedItem, RouteOptions, SearchHit, WorkflowError, WorkflowSurface,
        build_execution_plan, resolve_tools_with_source, route_fact_query,
    };

    fn connector() -> ConnectorEntry {
        ConnectorEntry::new("acme", "Acme Facts").with_remote_tools(vec![
            RemoteTool::new("acme.vector_search_items")
                .with_description("Semantic item search")
                .with_tags(["vector"]),
            RemoteTool::new("acme.get_entity_claims").with_tags(["claims"]),
        ])
    }

    #[test]
    fn test_format_tools_lists_each_tool() {
        let connector = connector();
        let resolved = resolve_tools_with_source(&connector);
        let output = ConsoleFormatter::format_tools(&connector, &resolved);

        assert!(output.contains("acme.vector_search_items"));
        assert!(output.contains("Semantic item search"));
        assert!(output.contains("declared"));
    }

    #[test]
    fn test_tools_json_shape() {
        let connector = connector();
        let resolved = resolve_tools_with_source(&connector);
        let json = ConsoleFormatter::tools_json(&connector, &resolved);

        assert_eq!(json["source"], "declared");
        assert_eq!(json["tools"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_format_route_marks_fallback() {
        let decision = route_fact_query(
            "q",
            &ConnectorEntry::new("empty", "Empty"),
            RouteOptions::default(),
        );
        let output = ConsoleFormatter::format_route(&decision);
        assert!(output.contains("no-remote-tools"));
    }

    #[test]
    fn test_format_plan_numbers_steps() {
        let surface = WorkflowSurface::from_entry(&connector());
        let plan = build_execution_plan("Who invented the telephone?", &surface);
        let output = ConsoleFormatter::format_plan(&plan);

        assert!(output.contains("Execution Plan"));
        assert!(output.contains("1. "));
        assert!(output.contains("invoke-primary"));
        assert!(output.contains("enrich-with-secondary"));
    }

    #[test]
    fn test_format_result_shows_error() {
        let result = WorkflowResult {
            degraded: true,
            error: Some(WorkflowError::configuration(
                "[factlink] no local fallback is configured",
            )),
            ..WorkflowResult::default()
        };
        let output = ConsoleFormatter::format_result(&result);
        assert!(output.contains("no local fallback is configured"));
    }

    #[test]
    fn test_format_result_lists_positions() {
        let result = WorkflowResult {
            results: RankedItem::from_local_hits(vec![
                SearchHit::new("doc-1", "first").with_title("First"),
                SearchHit::new("doc-2", "second"),
            ]),
            rank_preserved: true,
            degraded: true,
            ..WorkflowResult::default()
        };
        let output = ConsoleFormatter::format_result(&result);

        assert!(output.contains("doc-1"));
        assert!(output.contains("First"));
        assert!(output.contains("  2. "));
    }
}
