//! MCP (Model Context Protocol) server library.
//!
//! This crate hosts a set of named tools behind the MCP JSON-RPC protocol,
//! over stdio or HTTP.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mcp::{McpServer, ToolOutput, ToolRegistry};
//!
//! # async fn example() -> mcp::Result<()> {
//! let mut registry = ToolRegistry::new();
//! registry.register(
//!     "say_hello",
//!     "Say hello to someone",
//!     serde_json::json!({"type": "object"}),
//!     |_args| async { ToolOutput::Text("Hello!".to_string()) },
//! )?;
//!
//! let server = McpServer::new("hello", "0.1.0", Arc::new(registry));
//! server.serve_stdio().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod http;
mod protocol;
mod registry;
mod server;

pub use error::{Error, Result};
pub use http::{SESSION_HEADER, router, serve_http};
pub use protocol::{
    CallToolParams, CallToolResult, ClientInfo, InitializeParams, InitializeResult,
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, ListToolsResult, PROTOCOL_VERSION, RequestId,
    ServerCapabilities, ServerInfo, Tool, ToolContent, ToolsCapability,
};
pub use registry::{ToolOutput, ToolRegistry};
pub use server::{MAX_MESSAGE_SIZE, McpServer, parse_request};
