// ABOUTME: Transport seam between McpClient and the wire.
// ABOUTME: Streamable HTTP is the only wire the relay speaks.

mod http;

pub use http::{HttpOptions, HttpTransport};

use async_trait::async_trait;

use super::{McpNotification, McpRequest, McpResponse};
use crate::error::McpError;

/// Moves JSON-RPC messages to one MCP server.
///
/// A transport carries at most one session; `shutdown` ends it.
#[async_trait]
pub trait Transport: Send + Sync {
    /// The server URL, for diagnostics.
    fn endpoint(&self) -> &str;

    /// Send a request and return the response with the matching id.
    async fn send(&self, request: McpRequest) -> Result<McpResponse, McpError>;

    async fn notify(&self, notification: McpNotification) -> Result<(), McpError>;

    /// End the session, if any. Must be safe to call more than once.
    async fn shutdown(&self) -> Result<(), McpError>;
}
