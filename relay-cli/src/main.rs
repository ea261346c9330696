// ABOUTME: Command-line front end for mcp-relay.
// ABOUTME: Discovers tools across configured MCP servers and calls one by name.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use mcp_relay::logging;
use mcp_relay::prelude::*;

#[derive(Parser)]
#[command(name = "relay-cli", version, about = "Discover and call MCP tools")]
struct Cli {
    /// Directory holding default.yaml and <env>.yaml.
    #[arg(long, global = true, default_value = "config")]
    config_dir: PathBuf,

    /// Deployment environment (falls back to DEPLOYMENT_ENVIRONMENT, then dev).
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every tool the configured servers expose.
    Discover {
        /// Print tool definitions as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Call one discovered tool.
    Call {
        /// Exposed tool name.
        tool: String,
        /// Arguments as a JSON object.
        #[arg(default_value = "{}")]
        args: String,
    },
}

fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let settings = Settings::load(Some(cli.config_dir.as_path()), cli.env.as_deref())
        .context("Failed to load settings")?;
    logging::init(&settings.logging);

    let identity = WorkspaceIdentity::from_settings(&settings.databricks)
        .context("Failed to resolve workspace identity")?;
    let connector = WorkspaceConnector::new(Arc::new(identity));
    let registry = McpRegistry::new(Arc::new(connector));

    let discovery =
        registry.discover_blocking(&settings.mcp.managed_urls, &settings.mcp.custom_urls)?;

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Discover { json } => run_discover(&discovery, json, &mut stdout),
        Command::Call { tool, args } => {
            let output = run_call(&discovery, &tool, &args)?;
            writeln!(stdout, "{}", output)?;
            Ok(())
        }
    }
}

/// Print the discovered tools. Fails when any endpoint could not be listed.
fn run_discover(discovery: &Discovery, json: bool, out: &mut impl Write) -> Result<()> {
    print_discovery(discovery, json, out)?;

    for collision in discovery.collisions() {
        tracing::warn!(
            tool = %collision.name,
            endpoint = %collision.endpoint,
            exposed_as = %collision.exposed_as,
            "Tool renamed"
        );
    }
    for failure in discovery.failures() {
        tracing::error!(endpoint = %failure.endpoint, error = %failure.error, "Endpoint failed");
    }
    tracing::info!(
        tools = discovery.tools().len(),
        failures = discovery.failures().len(),
        "Discovery finished"
    );

    if !discovery.failures().is_empty() {
        bail!("{} endpoint(s) failed", discovery.failures().len());
    }
    Ok(())
}

/// Call one discovered tool with JSON arguments and return its text.
fn run_call(discovery: &Discovery, tool: &str, args: &str) -> Result<String> {
    let arguments: serde_json::Value =
        serde_json::from_str(args).context("Arguments must be valid JSON")?;
    let Some(found) = discovery.get(tool) else {
        bail!("Unknown tool '{}'", tool);
    };
    Ok(found.call(arguments)?)
}

fn print_discovery(discovery: &Discovery, json: bool, out: &mut impl Write) -> Result<()> {
    if json {
        let definitions: Vec<ToolDefinition> =
            discovery.tools().iter().map(McpTool::definition).collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&definitions)?)?;
        return Ok(());
    }

    for tool in discovery.tools() {
        writeln!(out, "{} ({})", tool.name(), tool.endpoint())?;
        writeln!(out, "    {}", tool.description())?;
        for (name, field) in tool.parameters().iter() {
            let marker = if field.required { "required" } else { "optional" };
            writeln!(out, "    {}: {} ({})", name, field.ty, marker)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    /// Channel serving one `add` tool, or failing for hosts named `down`.
    struct AddChannel {
        endpoint: ServerEndpoint,
    }

    #[async_trait]
    impl Channel for AddChannel {
        fn endpoint(&self) -> &ServerEndpoint {
            &self.endpoint
        }

        async fn list_tools(&self) -> Result<Vec<McpToolInfo>, McpError> {
            if self.endpoint.url().contains("down") {
                return Err(McpError::Connection("refused".into()));
            }
            Ok(vec![serde_json::from_value(json!({
                "name": "add",
                "description": "adds",
                "inputSchema": {
                    "properties": {"a": {"type": "integer"}, "b": {"type": "integer"}},
                    "required": ["a"]
                }
            }))?])
        }

        async fn call_tool(
            &self,
            _name: &str,
            arguments: serde_json::Value,
        ) -> Result<String, McpError> {
            let sum = arguments["a"].as_i64().unwrap_or(0) + arguments["b"].as_i64().unwrap_or(0);
            Ok(sum.to_string())
        }
    }

    struct AddConnector;

    impl Connector for AddConnector {
        fn open(&self, endpoint: &ServerEndpoint) -> Arc<dyn Channel> {
            Arc::new(AddChannel {
                endpoint: endpoint.clone(),
            })
        }
    }

    async fn discover(managed: &[&str], custom: &[&str]) -> Discovery {
        let to_vec = |urls: &[&str]| urls.iter().map(|u| u.to_string()).collect::<Vec<_>>();
        McpRegistry::new(Arc::new(AddConnector))
            .discover(&to_vec(managed), &to_vec(custom))
            .await
    }

    #[tokio::test]
    async fn test_discover_prints_tools() {
        let discovery = discover(&["https://m/mcp"], &[]).await;
        let mut out = Vec::new();

        run_discover(&discovery, false, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "add (https://m/mcp (managed))\n    adds\n    a: integer (required)\n    b: integer (optional)\n"
        );
    }

    #[tokio::test]
    async fn test_discover_prints_json_definitions() {
        let discovery = discover(&[], &["https://c/mcp"]).await;
        let mut out = Vec::new();

        run_discover(&discovery, true, &mut out).unwrap();

        let definitions: Vec<ToolDefinition> = serde_json::from_slice(&out).unwrap();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].name, "add");
        assert_eq!(definitions[0].input_schema["required"], json!(["a"]));
    }

    #[tokio::test]
    async fn test_discover_fails_when_an_endpoint_fails() {
        let discovery = discover(&["https://m/mcp"], &["https://down/mcp"]).await;
        let mut out = Vec::new();

        let err = run_discover(&discovery, false, &mut out).unwrap_err();

        assert_eq!(err.to_string(), "1 endpoint(s) failed");
        // Tools from healthy endpoints are still printed.
        assert!(String::from_utf8(out).unwrap().starts_with("add "));
    }

    #[tokio::test]
    async fn test_call_returns_tool_text() {
        let discovery = discover(&["https://m/mcp"], &[]).await;
        assert_eq!(run_call(&discovery, "add", r#"{"a": 2, "b": 3}"#).unwrap(), "5");
    }

    #[tokio::test]
    async fn test_call_rejects_unknown_tool_and_bad_json() {
        let discovery = discover(&["https://m/mcp"], &[]).await;

        let unknown = run_call(&discovery, "subtract", "{}").unwrap_err();
        assert_eq!(unknown.to_string(), "Unknown tool 'subtract'");

        let bad = run_call(&discovery, "add", "{not json").unwrap_err();
        assert_eq!(bad.to_string(), "Arguments must be valid JSON");
    }

    #[test]
    fn test_cli_parses_call_with_default_args() {
        let cli = Cli::try_parse_from(["relay-cli", "--env", "prod", "call", "add"]).unwrap();
        assert_eq!(cli.env.as_deref(), Some("prod"));
        match cli.command {
            Command::Call { tool, args } => {
                assert_eq!(tool, "add");
                assert_eq!(args, "{}");
            }
            Command::Discover { .. } => panic!("expected call"),
        }
    }
}
