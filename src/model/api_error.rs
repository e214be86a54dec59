use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upstream error codes arrive as integers from some services and as
/// short string identifiers from others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCodeValue {
    Int(i64),
    Text(String),
}

/// One normalized upstream error. Every field is optional: whatever the
/// upstream omitted stays absent rather than being zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ApiError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCodeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
}

impl ApiError {
    /// Maps one raw upstream error object. Never fails: unrecognized or
    /// missing fields simply stay `None`.
    pub fn from_json(raw: &Value) -> Self {
        let code = match raw.get("code") {
            Some(Value::Number(n)) => n.as_i64().map(ErrorCodeValue::Int),
            Some(Value::String(s)) => Some(ErrorCodeValue::Text(s.clone())),
            _ => None,
        };
        Self {
            code,
            status: raw.get("status").and_then(Value::as_i64),
            title: raw
                .get("title")
                .and_then(Value::as_str)
                .map(|s| s.to_string()),
            message: raw
                .get("message")
                .and_then(Value::as_str)
                .map(|s| s.to_string()),
            detail: raw
                .get("detail")
                .and_then(Value::as_str)
                .map(|s| s.to_string()),
            source: raw.get("source").filter(|v| !v.is_null()).cloned(),
        }
    }

    /// The synthetic error returned when tool arguments cannot be coerced.
    pub fn bad_request() -> Self {
        Self {
            code: Some(ErrorCodeValue::Int(400)),
            title: Some("Bad Request".to_string()),
            detail: Some("Invalid tool arguments".to_string()),
            ..Self::default()
        }
    }

    /// The synthetic error substituted for transport and mapping failures,
    /// and for unrecognized upstream error shapes.
    pub fn internal_error() -> Self {
        Self {
            status: Some(500),
            title: Some("internal error".to_string()),
            detail: Some(String::new()),
            ..Self::default()
        }
    }
}
