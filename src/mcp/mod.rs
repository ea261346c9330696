// ABOUTME: MCP module - Model Context Protocol client implementation.
// ABOUTME: Speaks JSON-RPC to remote MCP servers over streamable HTTP.

mod client;
mod transport;
mod types;

pub use client::McpClient;
pub use transport::{HttpOptions, HttpTransport, Transport};
pub use types::*;
