//! Tool catalog and mock dispatcher used in place of a live MCP client.

use std::collections::HashMap;

use mcp::{CallToolResult, Tool};
use serde_json::Value;
use tracing::debug;

use crate::mock::ToolMock;
use crate::{Error, Result};

/// The surface a model needs from an MCP client: the tool catalog and a way
/// to call a tool.
pub trait TestMcpClient: Send + Sync {
    /// Discovered tools, in discovery order.
    fn list_tools(&self) -> &[Tool];

    /// Call a tool by name.
    fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult>;
}

/// Dispatches tool calls to per-tool mocks.
///
/// Every discovered tool starts out with the error-flagged
/// [`not_implemented`](crate::not_implemented) behaviour. Tests configure the
/// mocks they need and call [`reset_mocks`](Self::reset_mocks) between
/// cases.
#[derive(Debug)]
pub struct AccuracyTestClient {
    tools: Vec<Tool>,
    mocks: HashMap<String, ToolMock>,
}

impl AccuracyTestClient {
    /// Build a dispatcher for a discovered catalog.
    ///
    /// Tool names must be unique.
    pub fn new(tools: Vec<Tool>) -> Result<Self> {
        let mut mocks = HashMap::with_capacity(tools.len());
        for tool in &tools {
            let name: &str = &tool.name;
            if mocks.insert(name.to_string(), ToolMock::new(name)).is_some() {
                return Err(Error::DuplicateTool(name.to_string()));
            }
        }
        Ok(Self { tools, mocks })
    }

    /// The mock standing in for `name`.
    pub fn get_mocked_tool_fn(&self, name: &str) -> Result<ToolMock> {
        self.mocks
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))
    }

    /// Restore every mock to its default and clear all call history.
    pub fn reset_mocks(&self) {
        for mock in self.mocks.values() {
            mock.reset();
        }
    }
}

impl TestMcpClient for AccuracyTestClient {
    fn list_tools(&self) -> &[Tool] {
        &self.tools
    }

    fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        let mock = self.get_mocked_tool_fn(name)?;
        debug!(tool = name, %arguments, "dispatching to mock");
        Ok(mock.invoke(arguments))
    }
}
