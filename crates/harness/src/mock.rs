//! Replaceable tool behaviour with call recording.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mcp::{CallToolResult, Content};
use serde_json::Value;

use crate::matchers::object_containing;

type MockFn = Arc<dyn Fn(&Value) -> CallToolResult + Send + Sync>;

#[derive(Clone)]
enum Behavior {
    Return(CallToolResult),
    Implementation(MockFn),
}

impl Behavior {
    fn run(&self, arguments: &Value) -> CallToolResult {
        match self {
            Self::Return(result) => result.clone(),
            Self::Implementation(f) => f(arguments),
        }
    }
}

struct MockState {
    behavior: Behavior,
    once: VecDeque<Behavior>,
    calls: Vec<Value>,
}

impl MockState {
    fn unimplemented(tool: &str) -> Self {
        Self {
            behavior: Behavior::Return(not_implemented(tool)),
            once: VecDeque::new(),
            calls: Vec::new(),
        }
    }
}

/// Result every mock returns until a test configures it.
pub fn not_implemented(tool: &str) -> CallToolResult {
    CallToolResult::error(vec![Content::text(format!(
        "Mock implementation for tool: {tool} is not implemented."
    ))])
}

/// Mocked implementation of one tool.
///
/// Handles are cheap to clone and share state: configuring a handle obtained
/// from [`AccuracyTestClient::get_mocked_tool_fn`](crate::AccuracyTestClient::get_mocked_tool_fn)
/// changes what the dispatcher returns for that tool.
#[derive(Clone)]
pub struct ToolMock {
    tool: Arc<str>,
    state: Arc<Mutex<MockState>>,
}

impl ToolMock {
    pub(crate) fn new(tool: &str) -> Self {
        Self {
            tool: Arc::from(tool),
            state: Arc::new(Mutex::new(MockState::unimplemented(tool))),
        }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Return `result` for every call not covered by a one-shot behaviour.
    pub fn mock_return_value(&self, result: CallToolResult) -> &Self {
        self.state().behavior = Behavior::Return(result);
        self
    }

    /// Return `result` for the next call only. One-shot results queue up.
    pub fn mock_return_value_once(&self, result: CallToolResult) -> &Self {
        self.state().once.push_back(Behavior::Return(result));
        self
    }

    /// Compute results from the call arguments.
    pub fn mock_implementation<F>(&self, f: F) -> &Self
    where
        F: Fn(&Value) -> CallToolResult + Send + Sync + 'static,
    {
        self.state().behavior = Behavior::Implementation(Arc::new(f));
        self
    }

    /// Compute the next call's result from its arguments.
    pub fn mock_implementation_once<F>(&self, f: F) -> &Self
    where
        F: Fn(&Value) -> CallToolResult + Send + Sync + 'static,
    {
        self.state()
            .once
            .push_back(Behavior::Implementation(Arc::new(f)));
        self
    }

    /// Record the call and produce its result.
    pub(crate) fn invoke(&self, arguments: Value) -> CallToolResult {
        let behavior = {
            let mut state = self.state();
            let behavior = match state.once.pop_front() {
                Some(once) => once,
                None => state.behavior.clone(),
            };
            state.calls.push(arguments.clone());
            behavior
        };
        behavior.run(&arguments)
    }

    /// Arguments of every call since the last reset, in call order.
    pub fn calls(&self) -> Vec<Value> {
        self.state().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    /// Arguments of the `n`-th call, counting from 1.
    pub fn nth_call(&self, n: usize) -> Option<Value> {
        let index = n.checked_sub(1)?;
        self.state().calls.get(index).cloned()
    }

    /// Whether any call's arguments contain `expected`.
    pub fn was_called_with(&self, expected: &Value) -> bool {
        self.state()
            .calls
            .iter()
            .any(|actual| object_containing(actual, expected))
    }

    /// Whether the `n`-th call (from 1) has arguments containing `expected`.
    pub fn nth_called_with(&self, n: usize, expected: &Value) -> bool {
        self.nth_call(n)
            .is_some_and(|actual| object_containing(&actual, expected))
    }

    /// Forget recorded calls and restore the unimplemented default.
    pub fn reset(&self) {
        *self.state() = MockState::unimplemented(&self.tool);
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ToolMock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolMock")
            .field("tool", &self.tool)
            .field("calls", &self.call_count())
            .finish()
    }
}
