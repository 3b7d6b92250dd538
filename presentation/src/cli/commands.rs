//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use factlink_domain::{FactScope, RouteOptions};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored text
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Fact scope accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    /// Primary entity facts
    Facts,
    /// Property (schema) lookup
    Properties,
}

impl From<ScopeArg> for FactScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Facts => FactScope::Facts,
            ScopeArg::Properties => FactScope::Properties,
        }
    }
}

/// CLI arguments for factlink
#[derive(Parser, Debug)]
#[command(name = "factlink")]
#[command(author, version, about = "Connector tool discovery and multi-step fact retrieval")]
#[command(long_about = r#"
factlink resolves the tools a connector exposes, normalizes their names, and
runs a fact lookup as a pipeline of remote calls:

1. Discovery: similarity search for candidate entities
2. Corroboration: structured claims for the top candidate
3. Enrichment (optional): a structured query built from the discovered entity

When discovery or corroboration fails, a local fallback store answers instead.

Configuration files are loaded from (in priority order):
1. FACTLINK_* environment variables
2. --config <path>     Explicit config file
3. ./factlink.toml     Project-level config
4. ~/.config/factlink/config.toml   Global config

Example:
  factlink --manifest connectors.toml tools wikidata
  factlink --manifest connectors.toml plan acme "Who invented the telephone?"
  factlink --manifest connectors.toml execute acme "Who invented the telephone?" -o json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Connector manifest (TOML or JSON); overrides [manifest] path
    #[arg(long, global = true, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the connectors in the manifest
    Connectors,

    /// Show the tools a connector resolves to
    Tools {
        /// Connector id
        connector: String,

        /// Ask the configured MCP server for its tool list as well
        #[arg(long)]
        live: bool,
    },

    /// Normalize an upstream tool name for a connector
    Normalize {
        /// Connector id
        connector: String,

        /// Upstream tool name
        name: String,
    },

    /// Pick the entry-point tool for a query
    Route {
        /// Connector id
        connector: String,

        /// Natural-language fact query
        query: String,

        #[command(flatten)]
        route: RouteArgs,
    },

    /// Build the execution plan for a query
    Plan {
        /// Connector id
        connector: String,

        /// Natural-language fact query
        query: String,
    },

    /// Run the full lookup workflow
    Execute {
        /// Connector id
        connector: String,

        /// Natural-language fact query
        query: String,

        #[command(flatten)]
        route: RouteArgs,

        /// Skip the optional enrichment step
        #[arg(long)]
        no_enrichment: bool,

        /// Per-call timeout in milliseconds; overrides [execution] timeout_ms
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,

        /// Local fallback store (JSON); overrides [fallback] path
        #[arg(long, value_name = "PATH")]
        fallback: Option<PathBuf>,

        /// Replay tool outcomes from a fixture file instead of a live server
        #[arg(long, value_name = "PATH")]
        fixtures: Option<PathBuf>,
    },
}

/// Routing flags shared by `route` and `execute`
#[derive(Args, Debug, Clone, Default)]
pub struct RouteArgs {
    /// Fact scope; overrides [routing] default_scope
    #[arg(long, value_enum)]
    pub scope: Option<ScopeArg>,

    /// Embedding dimension hint forwarded to the discovery tool
    #[arg(long, value_name = "N")]
    pub dimension_hint: Option<u64>,
}

impl RouteArgs {
    /// Apply these flags over configured defaults.
    pub fn apply_to(&self, mut options: RouteOptions) -> RouteOptions {
        if let Some(scope) = self.scope {
            options = options.with_scope(scope.into());
        }
        if let Some(hint) = self.dimension_hint {
            options = options.with_dimension_hint(hint);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_execute_parses_flags() {
        let cli = Cli::try_parse_from([
            "factlink",
            "--manifest",
            "connectors.toml",
            "execute",
            "acme",
            "Who invented the telephone?",
            "--scope",
            "properties",
            "--no-enrichment",
            "--timeout-ms",
            "250",
            "-o",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.manifest, Some(PathBuf::from("connectors.toml")));
        match cli.command {
            Some(Command::Execute {
                connector,
                route,
                no_enrichment,
                timeout_ms,
                ..
            }) => {
                assert_eq!(connector, "acme");
                assert_eq!(route.scope, Some(ScopeArg::Properties));
                assert!(no_enrichment);
                assert_eq!(timeout_ms, Some(250));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_route_args_override_configured_defaults() {
        let configured = RouteOptions::default().with_dimension_hint(512);
        let args = RouteArgs {
            scope: Some(ScopeArg::Properties),
            dimension_hint: None,
        };

        let options = args.apply_to(configured);
        assert_eq!(options.scope, Some(FactScope::Properties));
        assert_eq!(options.dimension_hint, Some(512));
    }

    #[test]
    fn test_show_config_without_subcommand() {
        let cli = Cli::try_parse_from(["factlink", "--show-config"]).unwrap();
        assert!(cli.show_config);
        assert!(cli.command.is_none());
    }
}
