//! CLI entrypoint for factlink
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use factlink_application::{
    AuditLogger, ExecuteWorkflowInput, ExecuteWorkflowUseCase, LocalFallbackPort, ToolTransport,
};
use factlink_domain::{
    ConnectorEntry, NormalizedToolName, RouteOptions, WorkflowSurface, build_execution_plan,
    normalize_tool_name, resolve_tools_with_source, route_fact_query,
};
use factlink_infrastructure::{
    ConfigLoader, ConnectorManifest, FileConfig, JsonFallbackStore, JsonlAuditLogger,
    ManifestLoader, McpStdioTransport, ScriptedTransport, TransportSelection,
};
use factlink_presentation::{
    Cli, Command, ConsoleFormatter, OutputFormat, ProgressReporter, RouteArgs,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_ref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    let _guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("failed to load configuration: {}", e))?
    };
    config.validate()?;

    let Some(command) = cli.command.as_ref() else {
        bail!("No command given. Run `factlink --help` for usage.");
    };

    info!("Starting factlink");

    let manifest = load_manifest(&cli, &config)?;

    match command {
        Command::Connectors => {
            let output = match cli.output {
                OutputFormat::Text => ConsoleFormatter::format_connectors(&manifest.connectors),
                OutputFormat::Json => ConsoleFormatter::format_json(&manifest.connectors),
            };
            println!("{}", output);
        }
        Command::Tools { connector, live } => {
            let entry = manifest.require(connector)?;
            show_tools(&cli, &config, entry, *live).await?;
        }
        Command::Normalize { connector, name } => {
            let entry = manifest.require(connector)?;
            let normalized = normalize_tool_name(name, &entry.id, entry);
            let output = match cli.output {
                OutputFormat::Text => ConsoleFormatter::format_normalized(&normalized),
                OutputFormat::Json => ConsoleFormatter::format_json(&normalized),
            };
            println!("{}", output);
        }
        Command::Route {
            connector,
            query,
            route,
        } => {
            let entry = manifest.require(connector)?;
            let options = route_options(&config, route)?;
            let decision = route_fact_query(query, entry, options);
            let output = match cli.output {
                OutputFormat::Text => ConsoleFormatter::format_route(&decision),
                OutputFormat::Json => ConsoleFormatter::format_json(&decision),
            };
            println!("{}", output);
        }
        Command::Plan { connector, query } => {
            let entry = manifest.require(connector)?;
            let plan = build_execution_plan(query, &WorkflowSurface::from_entry(entry));
            let output = match cli.output {
                OutputFormat::Text => ConsoleFormatter::format_plan(&plan),
                OutputFormat::Json => ConsoleFormatter::format_json(&plan),
            };
            println!("{}", output);
        }
        Command::Execute {
            connector,
            query,
            route,
            no_enrichment,
            timeout_ms,
            fallback,
            fixtures,
        } => {
            let entry = manifest.require(connector)?.clone();

            // === Dependency Injection ===
            let transport = build_transport(&config, fixtures.as_deref()).await?;
            let mut use_case = ExecuteWorkflowUseCase::new(transport);

            let fallback_path = fallback.as_ref().or(config.fallback.path.as_ref());
            if let Some(path) = fallback_path {
                let store = JsonFallbackStore::load(path, config.fallback.limit)
                    .with_context(|| format!("failed to load fallback store {}", path.display()))?;
                use_case = use_case.with_local_fallback(Arc::new(store) as Arc<dyn LocalFallbackPort>);
            }
            if let Some(path) = &config.audit.path {
                match JsonlAuditLogger::open(path) {
                    Ok(logger) => {
                        use_case = use_case.with_audit_logger(Arc::new(logger) as Arc<dyn AuditLogger>);
                    }
                    Err(e) => warn!(path = %path.display(), error = %e, "Audit log disabled"),
                }
            }

            let mut params = config.execution.to_params();
            if let Some(ms) = timeout_ms {
                params = params.with_timeout_ms(*ms);
            }
            let mut input = ExecuteWorkflowInput::new(query.clone(), entry)
                .with_route(route_options(&config, route)?)
                .with_params(params);
            if *no_enrichment {
                input = input.without_enrichment();
            }

            let token = CancellationToken::new();
            let on_interrupt = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted; cancelling workflow");
                    on_interrupt.cancel();
                }
            });
            let input = input.with_cancellation(token);

            let result = if cli.quiet || cli.output == OutputFormat::Json {
                use_case.execute(input).await
            } else {
                let progress = ProgressReporter::new();
                use_case.execute_with_progress(input, &progress).await
            };

            let output = match cli.output {
                OutputFormat::Text => ConsoleFormatter::format_result(&result),
                OutputFormat::Json => ConsoleFormatter::format_json(&result),
            };
            println!("{}", output);

            if let Some(error) = &result.error {
                bail!(error.clone());
            }
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity level, optionally teeing to a file.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("--log-file must name a file: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn load_manifest(cli: &Cli, config: &FileConfig) -> Result<ConnectorManifest> {
    let path: &PathBuf = cli
        .manifest
        .as_ref()
        .or(config.manifest.path.as_ref())
        .ok_or_else(|| anyhow!("No connector manifest. Pass --manifest or set [manifest] path."))?;
    let manifest = ManifestLoader::load(path)?;
    info!(path = %path.display(), connectors = manifest.len(), "Loaded manifest");
    Ok(manifest)
}

fn route_options(config: &FileConfig, args: &RouteArgs) -> Result<RouteOptions> {
    Ok(args.apply_to(config.routing.to_route_options()?))
}

/// Pick the transport: `--fixtures` wins over the configured selection.
async fn build_transport(
    config: &FileConfig,
    fixtures: Option<&Path>,
) -> Result<Arc<dyn ToolTransport>> {
    if let Some(path) = fixtures {
        return Ok(Arc::new(ScriptedTransport::load(path)?));
    }
    match config.transport.selection()? {
        TransportSelection::Scripted(path) => Ok(Arc::new(ScriptedTransport::load(&path)?)),
        TransportSelection::Mcp { command, args, env } => {
            let transport = McpStdioTransport::connect(&command, &command, &args, &env).await?;
            Ok(Arc::new(transport))
        }
        TransportSelection::Unconfigured => bail!(
            "No transport configured. Set [transport] command (MCP server) or fixtures, or pass --fixtures."
        ),
    }
}

async fn show_tools(
    cli: &Cli,
    config: &FileConfig,
    entry: &ConnectorEntry,
    live: bool,
) -> Result<()> {
    let resolved = resolve_tools_with_source(entry);

    if !live {
        let output = match cli.output {
            OutputFormat::Text => ConsoleFormatter::format_tools(entry, &resolved),
            OutputFormat::Json => {
                ConsoleFormatter::format_json(&ConsoleFormatter::tools_json(entry, &resolved))
            }
        };
        println!("{}", output);
        return Ok(());
    }

    let TransportSelection::Mcp { command, args, env } = config.transport.selection()? else {
        bail!("--live needs an MCP server. Set [transport] command.");
    };
    let server = McpStdioTransport::connect(&command, &command, &args, &env).await?;
    let live_tools = server.remote_tools().await;
    server.shutdown().await?;

    let live_names: Vec<NormalizedToolName> = live_tools?
        .iter()
        .map(|tool| normalize_tool_name(&tool.name, &entry.id, entry))
        .collect();

    match cli.output {
        OutputFormat::Text => {
            println!("{}", ConsoleFormatter::format_tools(entry, &resolved));
            println!("{}", ConsoleFormatter::format_live_tools(&command, &live_names));
        }
        OutputFormat::Json => {
            let mut value = ConsoleFormatter::tools_json(entry, &resolved);
            value["live"] = serde_json::to_value(&live_names)?;
            println!("{}", ConsoleFormatter::format_json(&value));
        }
    }
    Ok(())
}
