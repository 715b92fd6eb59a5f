//! Chat completion endpoints.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ModelError;
use super::types::{AssistantMessage, FunctionTool, Message};

/// Request body for `POST {base_url}/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    #[serde(skip_serializing_if = "is_empty")]
    pub tools: &'a [FunctionTool],
    /// Number of candidate completions; the harness always asks for one.
    pub n: u32,
}

fn is_empty<T>(items: &&[T]) -> bool {
    items.is_empty()
}

/// Response body of a chat completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl ChatCompletionResponse {
    /// A response with a single choice carrying `message`.
    pub fn from_message(message: AssistantMessage) -> Self {
        Self {
            choices: vec![Choice {
                index: 0,
                message: Some(message),
                finish_reason: None,
            }],
        }
    }

    /// The first choice's message, if any.
    pub fn into_first_message(self) -> Option<AssistantMessage> {
        self.choices.into_iter().next().and_then(|c| c.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub message: Option<AssistantMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Something that answers chat completion requests.
pub trait CompletionEndpoint: Send + Sync {
    fn complete(
        &self,
        request: &ChatCompletionRequest<'_>,
    ) -> impl Future<Output = Result<ChatCompletionResponse, ModelError>> + Send;
}

/// OpenAI-compatible HTTP endpoint.
///
/// Providers differ only in base URL and credential.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpEndpoint {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/chat/completions")
    }
}

impl fmt::Display for HttpEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_url)
    }
}

impl CompletionEndpoint for HttpEndpoint {
    async fn complete(
        &self,
        request: &ChatCompletionRequest<'_>,
    ) -> Result<ChatCompletionResponse, ModelError> {
        let url = self.completions_url();
        debug!(%url, model = request.model, messages = request.messages.len(), "chat completion");

        let mut req = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .header("accept", "application/json");

        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .json(request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!("{status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))
    }
}
