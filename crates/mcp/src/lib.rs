//! MCP (Model Context Protocol) plumbing for tool discovery.
//!
//! The protocol itself comes from the official rmcp SDK. This crate adds
//! an in-memory duplex transport that rmcp sessions can run over, a
//! discovery client, and a server handler that advertises a static tool
//! catalog.
//!
//! # Example
//!
//! ```no_run
//! use mcp::{Client, StaticCatalog, duplex, implementation, spawn_session, tool};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (mut client_end, mut server_end) = duplex();
//! client_end.start()?;
//! server_end.start()?;
//!
//! let catalog = StaticCatalog::new(
//!     implementation("server", "1.0.0"),
//!     vec![tool("find", "Run a find query", serde_json::json!({"type": "object"}))],
//! );
//! spawn_session(catalog, server_end);
//!
//! let client = Client::connect(client_end, implementation("client", "0.0.0")).await?;
//! for tool in client.list_tools().await? {
//!     println!("Tool: {}", tool.name);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod server;
mod tool;
mod transport;

pub use client::{Client, DEFAULT_TIMEOUT, ServerConfig};
pub use error::{Error, Result};
pub use rmcp::model::{CallToolResult, Content, Implementation, JsonObject, Tool};
pub use rmcp::ServerHandler;
pub use server::{StaticCatalog, spawn_session};
pub use tool::{ToolResultExt, implementation, input_schema, tool};
pub use transport::{
    ClientTransport, DEFAULT_CAPACITY, InMemoryTransport, ServerTransport, duplex,
};
