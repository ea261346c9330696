// ABOUTME: MCP wire types - JSON-RPC envelopes plus the tools/list, tools/call,
// ABOUTME: and initialize payloads the relay sends and receives.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::McpError;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

const JSONRPC_VERSION: &str = "2.0";

/// Protocol revision sent during initialize.
pub const PROTOCOL_VERSION: &str = "2025-03-26";

fn jsonrpc_version() -> String {
    JSONRPC_VERSION.to_string()
}

/// A JSON-RPC request. Ids are unique per process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl McpRequest {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: jsonrpc_version(),
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC notification; the server sends nothing back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl McpNotification {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: jsonrpc_version(),
            method: method.into(),
            params: None,
        }
    }
}

/// A JSON-RPC response carrying either `result` or `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    #[serde(default = "jsonrpc_version")]
    pub jsonrpc: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<McpRpcError>,
}

impl McpResponse {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: jsonrpc_version(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: u64, error: McpRpcError) -> Self {
        Self {
            jsonrpc: jsonrpc_version(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// The result payload, or the server's error as [`McpError::Rpc`].
    pub fn into_result(self) -> Result<Value, McpError> {
        match (self.error, self.result) {
            (Some(error), _) => Err(McpError::Rpc {
                code: error.code,
                message: error.message,
            }),
            (None, Some(result)) => Ok(result),
            (None, None) => Err(McpError::Protocol(format!(
                "response {} has neither result nor error",
                self.id
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A tool as listed by a server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpToolInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Value,
}

/// Params for `tools/list`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct McpListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// One page of `tools/list`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpToolsPage {
    #[serde(default)]
    pub tools: Vec<McpToolInfo>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Params for `tools/call`.
#[derive(Debug, Clone, Serialize)]
pub struct McpCallParams<'a> {
    pub name: &'a str,
    pub arguments: Value,
}

/// A content block in a tool result. Only text is interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum McpContentBlock {
    Text { text: String },
    /// Images, audio, embedded resources, and anything newer.
    #[serde(other)]
    Other,
}

/// Result of `tools/call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpToolResult {
    #[serde(default)]
    pub content: Vec<McpContentBlock>,
    #[serde(default)]
    pub is_error: bool,
}

impl McpToolResult {
    /// Concatenate the text blocks of the result. Non-text blocks are dropped.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut dropped = 0usize;
        for block in &self.content {
            match block {
                McpContentBlock::Text { text } => out.push_str(text),
                McpContentBlock::Other => dropped += 1,
            }
        }
        if dropped > 0 {
            tracing::debug!(dropped, "Dropped non-text content from tool result");
        }
        out
    }
}

/// Name and version of a client or server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpImplementation {
    pub name: String,
    pub version: String,
}

impl McpImplementation {
    /// How this crate introduces itself.
    pub fn relay() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Params for `initialize`. The relay advertises no client capabilities.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McpInitializeParams {
    pub protocol_version: String,
    pub capabilities: serde_json::Map<String, Value>,
    pub client_info: McpImplementation,
}

impl Default for McpInitializeParams {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: serde_json::Map::new(),
            client_info: McpImplementation::relay(),
        }
    }
}

/// Result of `initialize`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpInitializeResult {
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: serde_json::Map<String, Value>,
    #[serde(default)]
    pub server_info: Option<McpImplementation>,
}

impl McpInitializeResult {
    pub fn supports_tools(&self) -> bool {
        self.capabilities.contains_key("tools")
    }
}
