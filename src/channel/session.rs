// ABOUTME: One MCP session per channel operation - connect, initialize, run, release.
// ABOUTME: Shared by the managed and custom channels; release happens on every path.

use std::future::Future;

use crate::auth::CredentialProvider;
use crate::error::McpError;
use crate::mcp::{HttpOptions, McpClient};

use super::ServerEndpoint;

/// Run `operation` inside a fresh, initialized session against `endpoint`.
///
/// The session is shut down whether the handshake, the operation, or neither fails.
pub(crate) async fn with_session<T, F, Fut>(
    endpoint: &ServerEndpoint,
    credentials: &dyn CredentialProvider,
    options: &HttpOptions,
    operation: F,
) -> Result<T, McpError>
where
    F: FnOnce(McpClient) -> Fut,
    Fut: Future<Output = (McpClient, Result<T, McpError>)>,
{
    let client = McpClient::connect(endpoint.url(), Some(credentials), options).await?;

    if let Err(e) = client.initialize().await {
        release(endpoint, &client).await;
        return Err(e);
    }

    let (client, outcome) = operation(client).await;
    release(endpoint, &client).await;
    outcome
}

async fn release(endpoint: &ServerEndpoint, client: &McpClient) {
    if let Err(e) = client.shutdown().await {
        tracing::debug!(endpoint = %endpoint.url(), kind = %endpoint.kind(), error = %e, "Session release failed");
    }
}
