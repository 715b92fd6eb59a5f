//! Declarative accuracy scenarios.
//!
//! A scenario is a prompt, the mock results tools should return, and the
//! calls the model is expected to make. Scenarios deserialize from the
//! `[[scenarios]]` tables of a config file:
//!
//! ```toml
//! [[scenarios]]
//! name = "find users"
//! prompt = "find all users in collection users"
//!
//! [[scenarios.mocks]]
//! tool = "find"
//! content = ['{"name": "Happy puppy!"}']
//!
//! [[scenarios.expect]]
//! tool = "find"
//! times = 1
//! arguments = { collection = "users" }
//! ```

use std::fmt;

use mcp::{CallToolResult, Content};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::client::AccuracyTestClient;
use crate::{Error, Result};
use crate::llm::Message;
use crate::matchers::matches;
use crate::mock::ToolMock;
use crate::model::Model;

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub prompt: String,
    /// Replaces the model's default system prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub mocks: Vec<MockSetup>,
    #[serde(default)]
    pub expect: Vec<Expectation>,
}

/// Canned result for one tool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MockSetup {
    pub tool: String,
    /// Text parts of the result.
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub is_error: bool,
    /// Answer only the next call instead of every call.
    #[serde(default)]
    pub once: bool,
}

impl MockSetup {
    pub fn result(&self) -> CallToolResult {
        let content = self.content.iter().map(Content::text).collect();
        if self.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }

    fn install(&self, mock: &ToolMock) {
        if self.once {
            mock.mock_return_value_once(self.result());
        } else {
            mock.mock_return_value(self.result());
        }
    }
}

/// What a tool's call history should look like after the conversation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Expectation {
    pub tool: String,
    #[serde(default = "yes")]
    pub called: bool,
    /// Exact number of calls.
    #[serde(default)]
    pub times: Option<usize>,
    /// Apply `arguments` to this call only, counting from 1.
    #[serde(default)]
    pub nth: Option<usize>,
    #[serde(default)]
    pub arguments: Option<Value>,
    /// Compare arguments by deep equality instead of subset.
    #[serde(default)]
    pub exact: bool,
}

impl Expectation {
    /// Failure messages for `mock`'s call history; empty when satisfied.
    pub fn check(&self, mock: &ToolMock) -> Vec<String> {
        let tool = &self.tool;
        let calls = mock.calls();
        let mut failures = Vec::new();

        if !self.called {
            if !calls.is_empty() {
                failures.push(format!(
                    "{tool}: expected no calls, got {} ({})",
                    calls.len(),
                    render(&calls)
                ));
            }
            return failures;
        }

        if let Some(times) = self.times {
            if calls.len() != times {
                failures.push(format!(
                    "{tool}: expected {times} call(s), got {}",
                    calls.len()
                ));
            }
        }

        match (self.nth, &self.arguments) {
            (Some(n), Some(expected)) => match mock.nth_call(n) {
                Some(actual) if matches(&actual, expected, self.exact) => {}
                Some(actual) => failures.push(format!(
                    "{tool}: call {n} had arguments {actual}, expected {expected}"
                )),
                None => failures.push(format!(
                    "{tool}: expected a call {n} with arguments {expected}, got {} call(s)",
                    calls.len()
                )),
            },
            (Some(n), None) => {
                if calls.len() < n {
                    failures.push(format!(
                        "{tool}: expected at least {n} call(s), got {}",
                        calls.len()
                    ));
                }
            }
            (None, Some(expected)) => {
                if !calls.iter().any(|actual| matches(actual, expected, self.exact)) {
                    failures.push(format!(
                        "{tool}: no call with arguments {expected} (calls: {})",
                        render(&calls)
                    ));
                }
            }
            (None, None) => {
                if self.times.is_none() && calls.is_empty() {
                    failures.push(format!("{tool}: expected to be called"));
                }
            }
        }

        failures
    }
}

fn render(calls: &[Value]) -> String {
    if calls.is_empty() {
        return "none".to_string();
    }
    calls
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Outcome of one scenario against one model.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub scenario: String,
    pub model: String,
    pub failures: Vec<String>,
    pub history: Vec<Message>,
}

impl ScenarioReport {
    /// A failed report for a run that could not complete.
    pub fn errored(scenario: &str, model: impl fmt::Display, error: &Error) -> Self {
        Self {
            scenario: scenario.to_string(),
            model: model.to_string(),
            failures: vec![format!("error: {error}")],
            history: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Scenario {
    /// Run the scenario once against `model`.
    ///
    /// Mocks are reset before anything else, so scenarios sharing a client do
    /// not observe each other's calls. Naming a tool that was not discovered
    /// is an error, not a failed expectation.
    pub async fn run<M: Model>(
        &self,
        model: &M,
        client: &AccuracyTestClient,
    ) -> Result<ScenarioReport> {
        client.reset_mocks();

        for setup in &self.mocks {
            setup.install(&client.get_mocked_tool_fn(&setup.tool)?);
        }
        let mut expectations = Vec::with_capacity(self.expect.len());
        for expectation in &self.expect {
            expectations.push((expectation, client.get_mocked_tool_fn(&expectation.tool)?));
        }

        debug!(scenario = %self.name, model = %model, "running scenario");
        let history = model
            .chat(&self.prompt, client, self.system_prompt.as_deref())
            .await?;

        let failures: Vec<String> = expectations
            .iter()
            .flat_map(|(expectation, mock)| expectation.check(mock))
            .collect();

        info!(
            scenario = %self.name,
            model = %model,
            passed = failures.is_empty(),
            messages = history.len(),
            "scenario finished"
        );

        Ok(ScenarioReport {
            scenario: self.name.clone(),
            model: model.to_string(),
            failures,
            history,
        })
    }
}
