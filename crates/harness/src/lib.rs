//! Accuracy harness for tool-calling language models.
//!
//! The harness measures whether a model picks the right tool with the right
//! arguments for a natural-language prompt. Real tool execution is replaced
//! by mocks, so a run only exercises the model's decisions.
//!
//! # Overview
//!
//! - **Discovery**: [`discover_in_memory`] or [`discover_from_process`] runs
//!   the MCP handshake once and returns the server's tool catalog.
//! - **Dispatcher**: [`AccuracyTestClient`] exposes that catalog and routes
//!   every tool call to a per-tool [`ToolMock`].
//! - **Model**: a [`Model`] runs one conversation, feeding tool results back
//!   until the model stops calling tools or the loop bound is reached.
//! - **Scenarios**: a [`Scenario`] bundles a prompt, mock results, and the
//!   expected calls, and produces a [`ScenarioReport`].
//!
//! # Example
//!
//! ```no_run
//! use harness::{AccuracyTestClient, Model, OpenAiCompatibleModel, discover_in_memory};
//! use mcp::{CallToolResult, Content, StaticCatalog, implementation, tool};
//! use serde_json::json;
//!
//! # async fn example() -> harness::Result<()> {
//! let catalog = StaticCatalog::new(
//!     implementation("mock-server", "1.0.0"),
//!     vec![tool("find", "Run a find query", json!({"type": "object"}))],
//! );
//! let tools = discover_in_memory(catalog).await?;
//! let client = AccuracyTestClient::new(tools)?;
//! client
//!     .get_mocked_tool_fn("find")?
//!     .mock_return_value(CallToolResult::success(vec![Content::text(
//!         r#"{"name": "Happy puppy!"}"#,
//!     )]));
//!
//! let model = OpenAiCompatibleModel::ollama("llama3.1");
//! model.chat("find all users in collection users", &client, None).await?;
//!
//! assert!(client.get_mocked_tool_fn("find")?.was_called_with(&json!({"collection": "users"})));
//! # Ok(())
//! # }
//! ```

mod arguments;
mod client;
mod discovery;
mod error;
pub mod llm;
mod matchers;
mod mock;
pub mod model;
mod scenario;

pub use arguments::{PARSE_ERROR_MESSAGE, parse_arguments};
pub use client::{AccuracyTestClient, TestMcpClient};
pub use discovery::{DISCOVERY_CLIENT, discover_from_process, discover_in_memory, discover_tools};
pub use error::{Error, Result};
pub use llm::{CompletionEndpoint, HttpEndpoint, Message, ModelError, ReplayEndpoint};
pub use matchers::{json_eq, matches, object_containing};
pub use mock::{ToolMock, not_implemented};
pub use model::{
    BASIC_SYSTEM_PROMPT, MAX_CONVERSATION_LOOPS, Model, OpenAiCompatibleModel, Provider,
    ProviderOptions,
};
pub use scenario::{Expectation, MockSetup, Scenario, ScenarioReport};
