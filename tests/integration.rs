// ABOUTME: Integration tests verifying modules work together.
// ABOUTME: Discovers and calls tools against in-process MCP servers over HTTP.

use std::sync::Arc;

use mcp_relay::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Minimal MCP server: answers the handshake, lists `tools`, and implements
/// `add` plus a tool that reports an error. Requests other than `initialize`
/// must carry the session it issued.
struct FakeMcpServer {
    tools: Value,
}

impl Respond for FakeMcpServer {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let in_session = request
            .headers
            .get("Mcp-Session-Id")
            .is_some_and(|v| v.as_bytes() == b"session-1");
        if body["method"] != "initialize" && !in_session {
            return ResponseTemplate::new(400).set_body_string("No valid session ID provided");
        }

        let Some(id) = body.get("id").cloned() else {
            return ResponseTemplate::new(202);
        };

        let result = match body["method"].as_str().unwrap_or_default() {
            "initialize" => json!({
                "protocolVersion": "2025-03-26",
                "capabilities": {"tools": {}},
                "serverInfo": {"name": "fake", "version": "0"}
            }),
            "tools/list" => json!({"tools": self.tools}),
            "tools/call" => {
                let args = &body["params"]["arguments"];
                match body["params"]["name"].as_str().unwrap_or_default() {
                    "add" => {
                        let sum = args["a"].as_i64().unwrap_or(0) + args["b"].as_i64().unwrap_or(0);
                        json!({"content": [{"type": "text", "text": sum.to_string()}]})
                    }
                    other => json!({
                        "content": [{"type": "text", "text": format!("{} is broken", other)}],
                        "isError": true
                    }),
                }
            }
            other => {
                return ResponseTemplate::new(200).set_body_json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {"code": -32601, "message": format!("unknown method {}", other)}
                }));
            }
        };

        ResponseTemplate::new(200)
            .insert_header("Mcp-Session-Id", "session-1")
            .set_body_json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
    }
}

async fn start_server(tools: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(FakeMcpServer { tools })
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

fn registry() -> McpRegistry {
    let identity = WorkspaceIdentity::with_token("https://workspace.example.com", "dapi-test");
    McpRegistry::new(Arc::new(WorkspaceConnector::new(Arc::new(identity))))
}

fn add_tool() -> Value {
    json!([{
        "name": "add",
        "description": "Add two integers",
        "inputSchema": {
            "type": "object",
            "properties": {"a": {"type": "integer"}, "b": {"type": "integer"}},
            "required": ["a", "b"]
        }
    }])
}

#[tokio::test]
async fn test_discover_and_call_managed_tool() {
    let server = start_server(add_tool()).await;

    let discovery = registry().discover(&[server.uri()], &[]).await;
    assert!(discovery.failures().is_empty());

    let tool = discovery.get("add").expect("add should be discovered").clone();
    assert_eq!(tool.channel_kind(), ChannelKind::Managed);
    assert_eq!(tool.description(), "Add two integers");
    assert_eq!(
        tool.parameters().get("a"),
        Some(&ParamField {
            ty: ParamType::Integer,
            required: true
        })
    );

    let output = tokio::task::spawn_blocking(move || tool.call(json!({"a": 2, "b": 3})))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(output, "5");
}

#[tokio::test]
async fn test_managed_and_custom_tools_in_order() {
    let managed = start_server(json!([
        {"name": "lookup", "inputSchema": {}},
        {"name": "summarize", "inputSchema": {"properties": {"text": {"type": "string"}}}}
    ]))
    .await;
    let custom = start_server(add_tool()).await;

    let discovery = registry()
        .discover(&[managed.uri()], &[custom.uri()])
        .await;

    let names: Vec<_> = discovery.tools().iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["lookup", "summarize", "add"]);
    assert_eq!(discovery.tools()[0].description(), "Tool: lookup");
    assert_eq!(discovery.tools()[2].channel_kind(), ChannelKind::Custom);

    let text = discovery.get("add").unwrap().invoke(json!({"a": 20, "b": 22})).await;
    assert_eq!(text.unwrap(), "42");
}

#[tokio::test]
async fn test_unreachable_custom_endpoint() {
    let discovery = registry()
        .discover(&[], &["http://127.0.0.1:9/mcp".to_string()])
        .await;

    assert!(discovery.tools().is_empty());
    assert_eq!(discovery.failures().len(), 1);
    assert_eq!(discovery.failures()[0].endpoint.kind(), ChannelKind::Custom);
}

#[tokio::test]
async fn test_one_bad_endpoint_does_not_hide_others() {
    let good = start_server(add_tool()).await;

    let discovery = registry()
        .discover(&["http://127.0.0.1:9/mcp".to_string(), good.uri()], &[])
        .await;

    assert_eq!(discovery.tools().len(), 1);
    assert_eq!(discovery.failures().len(), 1);
    assert_eq!(discovery.failures()[0].endpoint.url(), "http://127.0.0.1:9/mcp");
}

#[tokio::test]
async fn test_tool_reported_error_propagates() {
    let server = start_server(json!([{"name": "divide", "inputSchema": {}}])).await;

    let discovery = registry().discover(&[], &[server.uri()]).await;
    let result = discovery.get("divide").unwrap().invoke(json!({})).await;

    match result {
        Err(ToolError::Remote(McpError::ToolReported(message))) => {
            assert_eq!(message, "divide is broken")
        }
        other => panic!("Expected ToolReported, got {:?}", other),
    }
}

#[tokio::test]
async fn test_discovered_tools_in_tool_registry() {
    let first = start_server(add_tool()).await;
    let second = start_server(add_tool()).await;

    let discovery = registry()
        .discover(&[first.uri()], &[second.uri()])
        .await;
    assert_eq!(discovery.collisions().len(), 1);

    let tools = Registry::new();
    assert_eq!(tools.register_discovery(discovery).await, 2);
    assert_eq!(tools.count().await, 2);

    let result = tools.execute("add", json!({"a": 1, "b": 2})).await.unwrap();
    assert_eq!(result.content, "3");
    assert_eq!(result.metadata["channel"], "managed");

    // Definitions are sorted by name, so look entries up rather than index them.
    let definitions = tools.to_definitions().await;
    assert_eq!(definitions.len(), 2);
    let plain = definitions.iter().find(|d| d.name == "add").unwrap();
    assert_eq!(plain.input_schema["required"], json!(["a", "b"]));
    let qualified = definitions
        .iter()
        .find(|d| d.name != "add")
        .unwrap();
    assert!(qualified.name.ends_with("__add"));
    assert_eq!(qualified.description, "Add two integers");

    let renamed = tools.execute(&qualified.name, json!({"a": 5, "b": 5})).await.unwrap();
    assert_eq!(renamed.content, "10");
    assert_eq!(renamed.metadata["channel"], "custom");

    let missing = tools.execute("nope", json!({})).await;
    assert!(matches!(missing, Err(ToolError::NotFound(_))));
}

#[test]
fn test_blocking_discovery_from_sync_code() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(start_server(add_tool()));

    let discovery = registry()
        .discover_blocking(&[server.uri()], &[])
        .unwrap();
    let output = discovery.get("add").unwrap().call(json!({"a": -1, "b": 1})).unwrap();
    assert_eq!(output, "0");
}
