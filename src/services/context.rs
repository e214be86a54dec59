use crate::constants::headers as header_constants;
use crate::errors::ToolError;
use std::collections::BTreeMap;

/// Request-scoped call context: a trace id for log correlation and the
/// ambient headers merged into every outbound request. Built fresh per
/// `tools/call` and passed explicitly through every layer, so concurrent
/// invocations never share mutable state.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub trace_id: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl RequestContext {
    pub fn new(trace_id: impl Into<String>, headers: BTreeMap<String, String>) -> Self {
        Self {
            trace_id: Some(trace_id.into()),
            headers,
        }
    }

    pub fn trace_id(&self) -> &str {
        self.trace_id.as_deref().unwrap_or("-")
    }
}

/// Upstream API-key credentials, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ApiKeyAuth {
    api_id: i64,
    api_key: String,
}

impl ApiKeyAuth {
    pub fn from_env() -> Result<Self, ToolError> {
        let api_id = std::env::var("API_ID")
            .map_err(|_| ToolError::internal("API_ID is not set"))?
            .trim()
            .parse::<i64>()
            .map_err(|_| ToolError::internal("API_ID must be an integer"))?;
        let api_key = std::env::var("API_KEY")
            .map_err(|_| ToolError::internal("API_KEY is not set"))?;
        if api_key.trim().is_empty() {
            return Err(ToolError::internal("API_KEY must not be empty"));
        }
        Ok(Self { api_id, api_key })
    }

    pub fn new(api_id: i64, api_key: impl Into<String>) -> Self {
        Self {
            api_id,
            api_key: api_key.into(),
        }
    }

    pub fn ambient_headers(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                header_constants::API_ID_HEADER.to_string(),
                self.api_id.to_string(),
            ),
            (
                header_constants::API_KEY_HEADER.to_string(),
                self.api_key.clone(),
            ),
        ])
    }

    /// A fresh context for one tool call: credential headers plus a new
    /// trace id.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::new(uuid::Uuid::new_v4().to_string(), self.ambient_headers())
    }
}
