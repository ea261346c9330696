// ABOUTME: MCP client for talking to a single MCP server over streamable HTTP.
// ABOUTME: Covers the lifecycle handshake plus tool listing and tool calls.

use std::sync::Arc;

use super::transport::{HttpOptions, HttpTransport, Transport};
use super::{
    McpCallParams, McpInitializeParams, McpInitializeResult, McpListParams, McpNotification,
    McpRequest, McpToolInfo, McpToolResult, McpToolsPage,
};
use crate::auth::CredentialProvider;
use crate::error::McpError;

/// Upper bound on `tools/list` pages followed for one server.
const MAX_LIST_PAGES: usize = 64;

/// Client for communicating with an MCP server.
pub struct McpClient {
    transport: Arc<dyn Transport>,
}

impl McpClient {
    /// Open an HTTP connection to an MCP server.
    pub async fn connect(
        url: &str,
        credentials: Option<&dyn CredentialProvider>,
        options: &HttpOptions,
    ) -> Result<Self, McpError> {
        let transport = HttpTransport::connect(url, credentials, options).await?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// The server this client talks to.
    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// Build a client over an already-connected transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Send one request and decode its result.
    async fn request<P, R>(&self, method: &str, params: &P) -> Result<R, McpError>
    where
        P: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        let request = McpRequest::new(method, Some(serde_json::to_value(params)?));
        let result = self.transport.send(request).await?.into_result()?;
        Ok(serde_json::from_value(result)?)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Initialize the MCP session.
    pub async fn initialize(&self) -> Result<McpInitializeResult, McpError> {
        let init: McpInitializeResult = self
            .request("initialize", &McpInitializeParams::default())
            .await?;
        if !init.supports_tools() {
            tracing::debug!(
                endpoint = %self.transport.endpoint(),
                server = ?init.server_info,
                "Server did not advertise the tools capability"
            );
        }

        self.transport
            .notify(McpNotification::new("notifications/initialized"))
            .await?;

        Ok(init)
    }

    /// Shutdown the server connection.
    pub async fn shutdown(&self) -> Result<(), McpError> {
        self.transport.shutdown().await
    }

    // ========================================================================
    // Tools
    // ========================================================================

    /// List available tools from the server, following pagination cursors.
    pub async fn list_tools(&self) -> Result<Vec<McpToolInfo>, McpError> {
        let mut tools = Vec::new();
        let mut params = McpListParams::default();

        for _ in 0..MAX_LIST_PAGES {
            let page: McpToolsPage = self.request("tools/list", &params).await?;
            tools.extend(page.tools);

            match page.next_cursor {
                Some(next) if !next.is_empty() => params.cursor = Some(next),
                _ => return Ok(tools),
            }
        }

        Err(McpError::Protocol(format!(
            "tools/list did not finish within {} pages",
            MAX_LIST_PAGES
        )))
    }

    /// Call a tool on the server.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<McpToolResult, McpError> {
        self.request("tools/call", &McpCallParams { name, arguments })
            .await
    }
}
