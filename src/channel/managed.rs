// ABOUTME: Managed channel - servers behind the pre-authenticated workspace proxy.
// ABOUTME: Runs a streamable-HTTP session per operation with the ambient bearer credential.

use std::sync::Arc;

use async_trait::async_trait;

use super::session::with_session;
use super::{Channel, ServerEndpoint, result_text};
use crate::auth::CredentialProvider;
use crate::error::McpError;
use crate::mcp::{HttpOptions, McpToolInfo};

/// Channel to a managed MCP server.
///
/// The workspace identity already authorizes the proxy, so no per-server
/// OAuth flow is involved. The proxy still issues a session on `initialize`
/// and may reject requests that do not carry it.
pub struct ManagedChannel {
    endpoint: ServerEndpoint,
    identity: Arc<dyn CredentialProvider>,
    options: HttpOptions,
}

impl ManagedChannel {
    pub fn new(
        endpoint: ServerEndpoint,
        identity: Arc<dyn CredentialProvider>,
        options: HttpOptions,
    ) -> Self {
        Self {
            endpoint,
            identity,
            options,
        }
    }
}

#[async_trait]
impl Channel for ManagedChannel {
    fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    async fn list_tools(&self) -> Result<Vec<McpToolInfo>, McpError> {
        with_session(
            &self.endpoint,
            self.identity.as_ref(),
            &self.options,
            |client| async move {
                let outcome = client.list_tools().await;
                (client, outcome)
            },
        )
        .await
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<String, McpError> {
        let result = with_session(
            &self.endpoint,
            self.identity.as_ref(),
            &self.options,
            |client| async move {
                let outcome = client.call_tool(name, arguments).await;
                (client, outcome)
            },
        )
        .await?;
        result_text(result)
    }
}
