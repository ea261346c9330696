// ABOUTME: The Tool trait - one calling convention for every tool the loop can use,
// ABOUTME: and ToolDefinition, the name/description/schema triple it is shown.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ToolResult;

/// Something the reasoning loop can call by name with JSON arguments.
///
/// `McpTool` is the remote implementation; local tools plug in the same way.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Dispatch key. Unique within a `Registry`.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn schema(&self) -> serde_json::Value;

    /// Run the tool. Return a `ToolError` inside the `anyhow::Error` to keep its kind.
    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.schema(),
        }
    }
}

/// How a tool is presented to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}
