// ABOUTME: Root module for mcp-relay - MCP tool discovery and dynamic tool adapters.
// ABOUTME: Re-exports all public types from submodules.

pub mod auth;
pub mod bridge;
pub mod channel;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod prelude;
pub mod schema;
pub mod tool;

pub use error::RelayError;
