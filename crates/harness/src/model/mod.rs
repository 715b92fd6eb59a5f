//! Model abstraction.
//!
//! Each provider SDK shapes tools and conversations differently; a [`Model`]
//! hides those details behind one tool transform and one chat entry point.

mod openai_compatible;
mod provider;

pub use openai_compatible::{BASIC_SYSTEM_PROMPT, MAX_CONVERSATION_LOOPS, OpenAiCompatibleModel};
pub use provider::{Provider, ProviderOptions};

use std::fmt;
use std::future::Future;

use mcp::Tool;

use crate::Result;
use crate::client::TestMcpClient;
use crate::llm::Message;

/// A language model driven through a tool catalog.
pub trait Model: fmt::Display + Send + Sync {
    /// Provider-specific tool definition.
    type Tool;

    /// Map a discovered tool to the provider's function-calling schema.
    fn transform_tool(&self, tool: &Tool) -> Self::Tool;

    /// Run one conversation for `prompt` to completion, dispatching tool
    /// calls through `client`, and return the full message history.
    ///
    /// `system_prompt` replaces the model's default system prompt.
    fn chat<C: TestMcpClient>(
        &self,
        prompt: &str,
        client: &C,
        system_prompt: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Message>>> + Send;
}
