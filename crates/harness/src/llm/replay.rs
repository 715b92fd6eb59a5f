//! Offline completion endpoint that replays queued responses.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use super::ModelError;
use super::endpoint::{ChatCompletionRequest, ChatCompletionResponse, CompletionEndpoint};
use super::types::AssistantMessage;

/// Answers requests from a queue of prepared responses and records every
/// request body it receives.
///
/// Once the queue is empty, requests get a response with no choices.
#[derive(Debug, Default)]
pub struct ReplayEndpoint {
    responses: Mutex<VecDeque<ChatCompletionResponse>>,
    requests: Mutex<Vec<Value>>,
}

impl ReplayEndpoint {
    pub fn new(responses: impl IntoIterator<Item = ChatCompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replay the given assistant replies, one per request.
    pub fn from_messages(messages: impl IntoIterator<Item = AssistantMessage>) -> Self {
        Self::new(messages.into_iter().map(ChatCompletionResponse::from_message))
    }

    /// Queue another response.
    pub fn push(&self, response: ChatCompletionResponse) {
        lock(&self.responses).push_back(response);
    }

    /// Serialized bodies of every request received so far.
    pub fn requests(&self) -> Vec<Value> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

impl CompletionEndpoint for ReplayEndpoint {
    async fn complete(
        &self,
        request: &ChatCompletionRequest<'_>,
    ) -> Result<ChatCompletionResponse, ModelError> {
        let body = serde_json::to_value(request)
            .map_err(|e| ModelError::InvalidResponse(format!("serialize request: {e}")))?;
        lock(&self.requests).push(body);
        Ok(lock(&self.responses).pop_front().unwrap_or_default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
