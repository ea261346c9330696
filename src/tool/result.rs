// ABOUTME: ToolResult - what a dispatched tool hands back to the reasoning loop.
// ABOUTME: Flattened text output plus provenance such as endpoint and channel.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

/// Output of one tool execution. Failures travel as errors, never as results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolResult {
    pub content: String,
    pub metadata: HashMap<String, Value>,
}

impl ToolResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Attach a provenance entry. A value that cannot be serialized is skipped.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(v) => {
                self.metadata.insert(key, v);
            }
            Err(e) => tracing::debug!(key = %key, error = %e, "Skipping metadata value"),
        }
        self
    }

    /// A metadata entry, if present and a string.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}
