//! Model backed by any OpenAI-compatible chat completions endpoint.

use std::fmt;

use mcp::{Tool, ToolResultExt, input_schema};
use tracing::{debug, warn};

use super::Model;
use super::provider::{OLLAMA_API_KEY, Provider, ProviderOptions};
use crate::Result;
use crate::arguments::parse_arguments;
use crate::client::TestMcpClient;
use crate::llm::{
    ChatCompletionRequest, CompletionEndpoint, ContentPart, FunctionTool, HttpEndpoint, Message,
};

pub const BASIC_SYSTEM_PROMPT: &str = "Only respond with a tool call in valid JSON format when a tool is required. Do not include any other text or explanation.";

/// Upper bound on completion round-trips per conversation.
pub const MAX_CONVERSATION_LOOPS: usize = 3;

/// A model reached through the chat completions API.
///
/// Providers share the request shape and differ only in the endpoint the
/// model is constructed with.
pub struct OpenAiCompatibleModel<E = HttpEndpoint> {
    model: String,
    endpoint: E,
}

impl OpenAiCompatibleModel<HttpEndpoint> {
    pub fn new(model: impl Into<String>, options: ProviderOptions) -> Self {
        Self::with_endpoint(model, HttpEndpoint::new(options.base_url, options.api_key))
    }

    /// Connect to a known provider, reading its credential from the
    /// environment.
    pub fn from_provider(model: impl Into<String>, provider: Provider) -> Result<Self> {
        Ok(Self::new(model, provider.options()?))
    }

    pub fn openai(model: impl Into<String>) -> Result<Self> {
        Self::from_provider(model, Provider::OpenAi)
    }

    pub fn gemini(model: impl Into<String>) -> Result<Self> {
        Self::from_provider(model, Provider::Gemini)
    }

    pub fn ollama(model: impl Into<String>) -> Self {
        Self::new(
            model,
            ProviderOptions {
                base_url: Provider::Ollama.default_base_url().to_string(),
                api_key: Some(OLLAMA_API_KEY.to_string()),
            },
        )
    }
}

impl<E: CompletionEndpoint> OpenAiCompatibleModel<E> {
    pub fn with_endpoint(model: impl Into<String>, endpoint: E) -> Self {
        Self {
            model: model.into(),
            endpoint,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Alternate completions and tool dispatch until the model stops asking
    /// for tools, the endpoint returns nothing, or the loop bound is hit.
    async fn chat_loop<C: TestMcpClient>(
        &self,
        mut history: Vec<Message>,
        tools: &[FunctionTool],
        client: &C,
    ) -> Result<Vec<Message>> {
        for loop_count in 1..=MAX_CONVERSATION_LOOPS {
            let request = ChatCompletionRequest {
                model: &self.model,
                messages: &history,
                tools,
                n: 1,
            };
            let response = self.endpoint.complete(&request).await?;

            let Some(message) = response.into_first_message() else {
                warn!(model = %self.model, loop_count, "completion returned no message");
                return Ok(history);
            };

            let tool_calls = message.tool_calls().to_vec();
            history.push(Message::Assistant(message));

            if tool_calls.is_empty() {
                debug!(model = %self.model, loop_count, "model requested no tools");
                return Ok(history);
            }

            // Sequential on purpose: tool messages and recorded calls follow
            // request order.
            for call in tool_calls {
                let arguments = parse_arguments(&call.function.arguments);
                debug!(model = %self.model, loop_count, tool = %call.function.name, "tool call");
                let result = client.call_tool(&call.function.name, arguments)?;

                let content: Vec<ContentPart> = result.texts().map(ContentPart::text).collect();
                if !content.is_empty() {
                    history.push(Message::tool(call.id, content));
                }
            }
        }

        debug!(model = %self.model, "conversation loop bound reached");
        Ok(history)
    }
}

impl<E: CompletionEndpoint> Model for OpenAiCompatibleModel<E> {
    type Tool = FunctionTool;

    fn transform_tool(&self, tool: &Tool) -> FunctionTool {
        FunctionTool::new(
            tool.name.to_string(),
            tool.description.as_deref().map(str::to_string),
            input_schema(tool),
        )
    }

    async fn chat<C: TestMcpClient>(
        &self,
        prompt: &str,
        client: &C,
        system_prompt: Option<&str>,
    ) -> Result<Vec<Message>> {
        let history = vec![
            Message::system(system_prompt.unwrap_or(BASIC_SYSTEM_PROMPT)),
            Message::user(prompt),
        ];
        let tools: Vec<FunctionTool> = client
            .list_tools()
            .iter()
            .map(|tool| self.transform_tool(tool))
            .collect();

        self.chat_loop(history, &tools, client).await
    }
}

impl<E> fmt::Display for OpenAiCompatibleModel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OAI Compatible: {}", self.model)
    }
}
