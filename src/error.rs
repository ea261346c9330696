// ABOUTME: Defines all error types for the mcp-relay library using thiserror.
// ABOUTME: Each concern has its own error enum, unified under RelayError.

use std::path::PathBuf;

/// Top-level error type for the mcp-relay library.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("MCP error: {0}")]
    Mcp(#[from] McpError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from MCP protocol operations.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("RPC error ({code}): {message}")]
    Rpc { code: i32, message: String },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Tool reported an error: {0}")]
    ToolReported(String),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from tool operations.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Remote call failed: {0}")]
    Remote(#[from] McpError),

    #[error("Execution failed: {0}")]
    Execution(#[source] anyhow::Error),
}

/// Errors from resolving or using the workspace identity.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Workspace host is not configured")]
    MissingHost,

    #[error("No workspace credentials configured (token or client id/secret)")]
    MissingCredentials,

    #[error("Token exchange failed ({status}): {message}")]
    TokenExchange { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors from loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}
