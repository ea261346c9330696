// ABOUTME: Implements the Registry - a thread-safe, name-keyed tool set handed
// ABOUTME: to the reasoning loop for dispatch by tool name.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Tool, ToolDefinition, ToolResult};
use crate::discovery::Discovery;
use crate::error::ToolError;

/// Name-keyed tool set the reasoning loop dispatches against.
///
/// Clones share the same underlying map.
#[derive(Default)]
pub struct Registry {
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any tool already under its name.
    pub async fn register<T: Tool + 'static>(&self, tool: T) {
        self.register_arc(Arc::new(tool)).await;
    }

    pub async fn register_arc(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        let mut tools = self.tools.write().await;
        if tools.insert(name.clone(), tool).is_some() {
            tracing::warn!(tool = %name, "Replaced an already registered tool");
        }
    }

    pub async fn unregister(&self, name: &str) {
        let mut tools = self.tools.write().await;
        tools.remove(name);
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.get(name).cloned()
    }

    /// Registered names in sorted order.
    pub async fn list(&self) -> Vec<String> {
        let tools = self.tools.read().await;
        let mut names: Vec<_> = tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn count(&self) -> usize {
        let tools = self.tools.read().await;
        tools.len()
    }

    /// What the reasoning loop is shown, sorted by name.
    pub async fn to_definitions(&self) -> Vec<ToolDefinition> {
        let tools = self.tools.read().await;
        let mut defs: Vec<_> = tools
            .values()
            .map(|t| t.definition())
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Run the named tool. Failures keep their `ToolError` kind where the tool produced one.
    pub async fn execute(
        &self,
        name: &str,
        params: serde_json::Value,
    ) -> Result<ToolResult, ToolError> {
        let tool = self
            .get(name)
            .await
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        tool.execute(params).await.map_err(|e| match e.downcast::<ToolError>() {
            Ok(tool_error) => tool_error,
            Err(other) => ToolError::Execution(other),
        })
    }

    /// Add every adapter from a discovery pass.
    ///
    /// Returns how many names were newly added. An adapter whose name is
    /// already present (possible under `NamePolicy::Keep`) replaces the
    /// earlier entry and is not counted.
    pub async fn register_discovery(&self, discovery: Discovery) -> usize {
        let mut tools = self.tools.write().await;
        let mut added = 0;

        for tool in discovery.into_tools() {
            let name = tool.name().to_string();
            let endpoint = tool.endpoint().url().to_string();
            if tools.insert(name.clone(), Arc::new(tool)).is_some() {
                tracing::warn!(tool = %name, endpoint = %endpoint, "Discovered tool replaced an earlier one");
            } else {
                added += 1;
            }
        }

        added
    }
}

impl Clone for Registry {
    fn clone(&self) -> Self {
        Self {
            tools: Arc::clone(&self.tools),
        }
    }
}
