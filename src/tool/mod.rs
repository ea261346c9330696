// ABOUTME: Tool module - the Tool trait, results, registry, and the MCP adapter.
// ABOUTME: Everything the reasoning loop needs to see and call tools.

mod adapter;
mod registry;
mod result;
mod traits;

pub use adapter::McpTool;
pub use registry::*;
pub use result::*;
pub use traits::*;
