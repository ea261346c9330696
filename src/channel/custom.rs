// ABOUTME: Custom channel - independently hosted servers behind an OAuth handshake.
// ABOUTME: Every operation opens, initializes, uses, and releases its own session.

use std::sync::Arc;

use async_trait::async_trait;

use super::session::with_session;
use super::{Channel, ServerEndpoint, result_text};
use crate::auth::CredentialProvider;
use crate::error::McpError;
use crate::mcp::{HttpOptions, McpToolInfo};

/// Channel to a custom MCP server.
///
/// Connections are never pooled: each call pays the full handshake.
pub struct CustomChannel {
    endpoint: ServerEndpoint,
    credentials: Arc<dyn CredentialProvider>,
    options: HttpOptions,
}

impl CustomChannel {
    pub fn new(
        endpoint: ServerEndpoint,
        credentials: Arc<dyn CredentialProvider>,
        options: HttpOptions,
    ) -> Self {
        Self {
            endpoint,
            credentials,
            options,
        }
    }
}

#[async_trait]
impl Channel for CustomChannel {
    fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    async fn list_tools(&self) -> Result<Vec<McpToolInfo>, McpError> {
        with_session(
            &self.endpoint,
            self.credentials.as_ref(),
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
            self.credentials.as_ref(),
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
