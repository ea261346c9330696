// ABOUTME: McpTool - the uniform in-process handle for one remote MCP tool.
// ABOUTME: Pairs a translated ParameterSpec with the channel that reaches the tool.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Tool, ToolResult};
use crate::bridge;
use crate::channel::{Channel, ChannelKind, ServerEndpoint};
use crate::error::ToolError;
use crate::mcp::McpToolInfo;
use crate::schema::ParameterSpec;

/// A tool that forwards calls to an MCP server.
///
/// Built once per discovery pass and never mutated afterwards.
#[derive(Clone)]
pub struct McpTool {
    name: String,
    remote_name: String,
    description: String,
    parameters: ParameterSpec,
    channel: Arc<dyn Channel>,
}

impl McpTool {
    /// Build the adapter for a listed tool.
    pub fn new(info: &McpToolInfo, channel: Arc<dyn Channel>) -> Self {
        let description = match info.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d.to_string(),
            _ => format!("Tool: {}", info.name),
        };

        Self {
            name: info.name.clone(),
            remote_name: info.name.clone(),
            description,
            parameters: ParameterSpec::translate(&info.input_schema),
            channel,
        }
    }

    /// Expose the tool under a different name. Calls still use the server's name.
    pub(crate) fn renamed(mut self, name: String) -> Self {
        self.name = name;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name the server knows this tool by.
    pub fn remote_name(&self) -> &str {
        &self.remote_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &ParameterSpec {
        &self.parameters
    }

    pub fn endpoint(&self) -> &ServerEndpoint {
        self.channel.endpoint()
    }

    pub fn channel_kind(&self) -> ChannelKind {
        self.channel.endpoint().kind()
    }

    /// Call the remote tool. Arguments are passed through unvalidated and
    /// any failure is returned as-is.
    pub async fn invoke(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        tracing::debug!(
            tool = %self.name,
            endpoint = %self.endpoint().url(),
            channel = %self.channel_kind(),
            "Invoking MCP tool"
        );
        Ok(self.channel.call_tool(&self.remote_name, arguments).await?)
    }

    /// Blocking form of [`McpTool::invoke`] for synchronous callers.
    pub fn call(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let tool = self.clone();
        bridge::block_on(async move { tool.invoke(arguments).await })?
    }
}

impl std::fmt::Debug for McpTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpTool")
            .field("name", &self.name)
            .field("remote_name", &self.remote_name)
            .field("endpoint", self.endpoint())
            .field("parameters", &self.parameters)
            .finish()
    }
}

#[async_trait]
impl Tool for McpTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> serde_json::Value {
        self.parameters.to_json_schema()
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        let content = self.invoke(params).await?;
        Ok(ToolResult::text(content)
            .with_metadata("endpoint", self.endpoint().url())
            .with_metadata("channel", self.channel_kind().to_string()))
    }
}
