//! Structured content model for `tools/call` results.

use serde_json::{json, Value as JsonValue};

/// Wrapper to indicate a JSON value intended for structuredContent.
#[derive(Debug, Clone)]
pub struct StructuredJson(pub JsonValue);

impl From<JsonValue> for StructuredJson {
    fn from(v: JsonValue) -> Self {
        StructuredJson(v)
    }
}

impl StructuredJson {
    /// MCP `CallToolResult` shape: a text rendering for older clients plus
    /// the raw value under `structuredContent`.
    pub fn into_call_result(self) -> JsonValue {
        let text = self.0.to_string();
        json!({
            "content": [{ "type": "text", "text": text }],
            "structuredContent": self.0,
            "isError": false,
        })
    }
}
