//! Decoding of model-issued tool-call arguments.

use serde_json::{Value, json};

pub const PARSE_ERROR_MESSAGE: &str = "Could not parse JSON argument";

/// Parse raw tool-call argument text.
///
/// Never fails: text that is not valid JSON becomes
/// `{"error": "Could not parse JSON argument", "received": <raw>}` so a
/// malformed call still reaches the dispatcher and can be asserted on.
pub fn parse_arguments(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| {
        json!({
            "error": PARSE_ERROR_MESSAGE,
            "received": raw,
        })
    })
}
