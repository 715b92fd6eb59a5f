//! Conversation types (OpenAI chat completions wire format).
//!
//! Every supported provider exposes an OpenAI-compatible endpoint, so these
//! types are serialized as-is into requests and parsed as-is from responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn function_kind() -> String {
    "function".to_string()
}

/// Role of a message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A message in the conversation history.
///
/// The history is append-only: messages are pushed, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant(AssistantMessage),
    Tool {
        content: Vec<ContentPart>,
        tool_call_id: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// A tool-role message answering the call `tool_call_id`.
    pub fn tool(tool_call_id: impl Into<String>, content: Vec<ContentPart>) -> Self {
        Self::Tool {
            content,
            tool_call_id: tool_call_id.into(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::System { .. } => Role::System,
            Self::User { .. } => Role::User,
            Self::Assistant(_) => Role::Assistant,
            Self::Tool { .. } => Role::Tool,
        }
    }

    pub fn as_assistant(&self) -> Option<&AssistantMessage> {
        match self {
            Self::Assistant(message) => Some(message),
            _ => None,
        }
    }

    /// Tool calls requested by this message (empty unless assistant).
    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        self.as_assistant()
            .map(AssistantMessage::tool_calls)
            .unwrap_or_default()
    }
}

/// A reply produced by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallRequest>>,
}

impl AssistantMessage {
    /// A text-only reply.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: None,
        }
    }

    /// A reply requesting the given tool calls.
    pub fn with_tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            content: None,
            tool_calls: Some(tool_calls),
        }
    }

    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        self.tool_calls.as_deref().unwrap_or_default()
    }
}

/// A tool call requested by the model.
///
/// `function.arguments` is untrusted serialized text straight from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

impl ToolCallRequest {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: function_kind(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

/// A typed content part of a tool-role message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: String },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Tool definition in function-calling form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionDefinition,
}

impl FunctionTool {
    pub fn new(name: impl Into<String>, description: Option<String>, parameters: Value) -> Self {
        Self {
            kind: function_kind(),
            function: FunctionDefinition {
                name: name.into(),
                description,
                parameters,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the parameters, passed through untouched.
    pub parameters: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn messages_serialize_with_role_tag() {
        let history = vec![
            Message::system("sys"),
            Message::user("hi"),
            Message::Assistant(AssistantMessage::with_tool_calls(vec![ToolCallRequest::new(
                "call_1",
                "find",
                r#"{"collection":"users"}"#,
            )])),
            Message::tool("call_1", vec![ContentPart::text("ok")]),
        ];

        let value = serde_json::to_value(&history).unwrap();
        assert_eq!(value[0], json!({"role": "system", "content": "sys"}));
        assert_eq!(value[2]["role"], "assistant");
        assert_eq!(value[2]["tool_calls"][0]["type"], "function");
        assert_eq!(value[2]["tool_calls"][0]["function"]["name"], "find");
        assert_eq!(
            value[3],
            json!({
                "role": "tool",
                "content": [{"type": "text", "text": "ok"}],
                "tool_call_id": "call_1"
            })
        );
    }

    #[test]
    fn assistant_reply_with_null_tool_calls_parses() {
        let json = r#"{"role":"assistant","content":"done","tool_calls":null,"refusal":null}"#;
        let message: AssistantMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.content.as_deref(), Some("done"));
        assert!(message.tool_calls().is_empty());
    }

    #[test]
    fn tool_calls_only_on_assistant() {
        let call = ToolCallRequest::new("1", "count", "{}");
        let assistant = Message::Assistant(AssistantMessage::with_tool_calls(vec![call.clone()]));
        assert_eq!(assistant.tool_calls(), &[call]);
        assert!(Message::user("x").tool_calls().is_empty());
        assert_eq!(assistant.role(), Role::Assistant);
    }
}
