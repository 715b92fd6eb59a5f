//! Conveniences over the rmcp model types.

use rmcp::model::{CallToolResult, Implementation, JsonObject, Tool};
use serde_json::Value;

/// Name and version a peer announces during `initialize`.
pub fn implementation(name: impl Into<String>, version: impl Into<String>) -> Implementation {
    let mut info = Implementation::from_build_env();
    info.name = name.into();
    info.version = version.into();
    info
}

/// Build a tool descriptor from a JSON schema.
///
/// A schema that is not an object is replaced by `{}`.
pub fn tool(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Tool {
    let schema = match input_schema {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    };
    Tool::new(name.into(), description.into(), schema)
}

/// The tool's input schema as a plain JSON value.
pub fn input_schema(tool: &Tool) -> Value {
    Value::Object(tool.input_schema.as_ref().clone())
}

/// Read access to tool results.
pub trait ToolResultExt {
    /// Text parts in order; other content kinds are skipped.
    fn texts(&self) -> impl Iterator<Item = &str>;

    /// Whether the result is flagged as a tool-level failure.
    fn is_error_result(&self) -> bool;
}

impl ToolResultExt for CallToolResult {
    fn texts(&self) -> impl Iterator<Item = &str> {
        self.content
            .iter()
            .filter_map(|content| content.as_text())
            .map(|text| text.text.as_str())
    }

    fn is_error_result(&self) -> bool {
        self.is_error.unwrap_or(false)
    }
}
