//! Chat completion types and endpoints.

mod endpoint;
pub mod errors;
mod replay;
pub mod types;

pub use endpoint::{
    ChatCompletionRequest, ChatCompletionResponse, Choice, CompletionEndpoint, HttpEndpoint,
};
pub use errors::ModelError;
pub use replay::ReplayEndpoint;
pub use types::{
    AssistantMessage, ContentPart, FunctionCall, FunctionDefinition, FunctionTool, Message, Role,
    ToolCallRequest,
};
