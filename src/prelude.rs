// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use mcp_relay::prelude::*;` to get started quickly.

pub use crate::auth::{CredentialProvider, Credentials, WorkspaceIdentity};
pub use crate::channel::{
    Channel, ChannelKind, Connector, CustomChannel, ManagedChannel, ServerEndpoint,
    WorkspaceConnector,
};
pub use crate::config::{LogFormat, LogSettings, Settings};
pub use crate::discovery::{Discovery, EndpointFailure, McpRegistry, NameCollision, NamePolicy};
pub use crate::error::{AuthError, ConfigError, McpError, RelayError, ToolError};
pub use crate::mcp::{HttpOptions, McpClient, McpToolInfo, McpToolResult, Transport};
pub use crate::schema::{ParamField, ParamType, ParameterSpec};
pub use crate::tool::{McpTool, Registry, Tool, ToolDefinition, ToolResult};
