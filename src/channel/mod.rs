// ABOUTME: Channel module - the two invocation paths to remote MCP servers.
// ABOUTME: Managed (ambient workspace credential) and custom (OAuth), one session per call.

mod connector;
mod custom;
mod managed;
mod session;

pub use connector::{Connector, WorkspaceConnector};
pub use custom::CustomChannel;
pub use managed::ManagedChannel;

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::error::McpError;
use crate::mcp::{McpToolInfo, McpToolResult};

static NON_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("literal regex"));

/// How a server is reached and authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Already authenticated via the ambient workspace identity.
    Managed,
    /// Needs an OAuth handshake on every connection.
    Custom,
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelKind::Managed => f.write_str("managed"),
            ChannelKind::Custom => f.write_str("custom"),
        }
    }
}

/// A configured MCP server. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerEndpoint {
    url: String,
    kind: ChannelKind,
}

impl ServerEndpoint {
    pub fn new(url: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    pub fn managed(url: impl Into<String>) -> Self {
        Self::new(url, ChannelKind::Managed)
    }

    pub fn custom(url: impl Into<String>) -> Self {
        Self::new(url, ChannelKind::Custom)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Identifier-safe label for the server, used to qualify clashing tool names.
    ///
    /// `https://host.example.com/api/2.0/mcp/functions/main` becomes
    /// `host_example_com_api_2_0_mcp_functions_main`.
    pub fn slug(&self) -> String {
        let without_scheme = self
            .url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.url);

        let slug = NON_IDENT.replace_all(without_scheme, "_");
        let slug = slug.trim_matches('_');
        if slug.is_empty() {
            "server".to_string()
        } else {
            slug.to_string()
        }
    }
}

impl std::fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.url, self.kind)
    }
}

/// One way of reaching one server.
///
/// Both operations are single attempts: no retries, errors go straight back
/// to the caller.
#[async_trait]
pub trait Channel: Send + Sync {
    /// The server this channel talks to.
    fn endpoint(&self) -> &ServerEndpoint;

    /// List the server's tools in server order.
    async fn list_tools(&self) -> Result<Vec<McpToolInfo>, McpError>;

    /// Call a tool and return the concatenated text of its result.
    async fn call_tool(&self, name: &str, arguments: serde_json::Value)
    -> Result<String, McpError>;
}

/// Normalize a tool result to text, turning server-flagged errors into failures.
pub(crate) fn result_text(result: McpToolResult) -> Result<String, McpError> {
    let text = result.text();
    if result.is_error {
        return Err(McpError::ToolReported(text));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::McpContentBlock;

    #[test]
    fn test_endpoint_constructors() {
        let m = ServerEndpoint::managed("https://h/api/2.0/mcp/genie/abc");
        assert_eq!(m.kind(), ChannelKind::Managed);
        assert_eq!(m.url(), "https://h/api/2.0/mcp/genie/abc");

        let c = ServerEndpoint::custom("https://app.example.com/mcp");
        assert_eq!(c.kind(), ChannelKind::Custom);
        assert_eq!(c.to_string(), "https://app.example.com/mcp (custom)");
    }

    #[test]
    fn test_slug() {
        let e = ServerEndpoint::managed("https://host.example.com/api/2.0/mcp/functions/main");
        assert_eq!(e.slug(), "host_example_com_api_2_0_mcp_functions_main");

        assert_eq!(ServerEndpoint::custom("http://localhost:8000/").slug(), "localhost_8000");
        assert_eq!(ServerEndpoint::custom("://").slug(), "server");
    }

    #[test]
    fn test_result_text_success() {
        let result = McpToolResult {
            content: vec![
                McpContentBlock::Text { text: "5".into() },
                McpContentBlock::Other,
            ],
            is_error: false,
        };
        assert_eq!(result_text(result).unwrap(), "5");
    }

    #[test]
    fn test_result_text_flagged_error() {
        let result = McpToolResult {
            content: vec![McpContentBlock::Text {
                text: "division by zero".into(),
            }],
            is_error: true,
        };
        match result_text(result) {
            Err(McpError::ToolReported(msg)) => assert_eq!(msg, "division by zero"),
            other => panic!("Expected ToolReported, got {:?}", other),
        }
    }
}
