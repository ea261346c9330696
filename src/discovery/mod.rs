// ABOUTME: Discovery module - builds the aggregated MCP tool set from many servers.
// ABOUTME: Fails soft per endpoint and reports every suppressed error.

mod registry;

pub use registry::*;
