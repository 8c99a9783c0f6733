use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const JSONRPC_VERSION: &str = "2.0";

/// Decoded inbound call. Built by [`crate::mcp::codec::decode`].
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    pub method: String,
    pub params: Option<Value>,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub jsonrpc: String,
    pub id: i64,
    pub result: Value,
}

impl ResponseEnvelope {
    pub fn new(id: i64, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Uniform shape of every tool result: a single text item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEnvelope {
    pub content: Vec<ContentItem>,
}

impl ContentEnvelope {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem {
                kind: "text".to_string(),
                text: text.into(),
            }],
        }
    }

    /// Structured results are flattened to their JSON text.
    pub fn json<T: Serialize>(data: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::text(serde_json::to_string(data)?))
    }

    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|item| item.text.as_str())
    }
}

/// Result of a dispatch that did not hit a hard fault. Soft errors are still
/// ordinary protocol data.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    SoftError(String),
}

impl Outcome {
    pub fn status_ok() -> Self {
        Outcome::Success(json!({ "status": "ok" }))
    }

    pub fn into_result(self) -> Value {
        match self {
            Outcome::Success(payload) => payload,
            Outcome::SoftError(message) => json!({ "error": message }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn content_envelope_text_shape() {
        let value = serde_json::to_value(ContentEnvelope::text("System is running")).unwrap();
        assert_eq!(
            value,
            json!({ "content": [{ "type": "text", "text": "System is running" }] })
        );
    }

    #[test]
    fn content_envelope_json_flattens_to_string() {
        let envelope = ContentEnvelope::json(&vec!["a", "b"]).unwrap();
        assert_eq!(envelope.first_text(), Some(r#"["a","b"]"#));
    }

    #[test]
    fn soft_error_nests_message_in_result() {
        let result = Outcome::SoftError("Unknown method: ping".into()).into_result();
        assert_eq!(result, json!({ "error": "Unknown method: ping" }));
    }

    #[test]
    fn status_ok_payload() {
        assert_eq!(Outcome::status_ok().into_result(), json!({ "status": "ok" }));
    }

    #[test]
    fn tool_call_params_require_arguments() {
        let parsed: Result<ToolCallParams, _> =
            serde_json::from_value(json!({ "name": "get_devices" }));
        assert!(parsed.is_err());
    }
}
