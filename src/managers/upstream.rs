//! Single-request orchestration against the upstream management API:
//! header assembly, one GET, envelope extraction, record mapping.

use crate::constants::headers as header_constants;
use crate::errors::ToolError;
use crate::model::{ApiError, Envelope, Meta};
use crate::services::context::RequestContext;
use crate::services::logger::Logger;
use crate::services::transport::UpstreamTransport;
use crate::utils::env::env_string;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Receives the raw upstream error payload when a call fails with a
/// non-200 status. Fire-and-forget observability: implementations must
/// not influence the call outcome.
pub trait ErrorSink: Send + Sync {
    fn report(&self, payload: &Value);
}

/// Default sink: the raw payload goes to the error log.
pub struct LoggingErrorSink {
    logger: Logger,
}

impl LoggingErrorSink {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger: logger.child("upstream"),
        }
    }
}

impl ErrorSink for LoggingErrorSink {
    fn report(&self, payload: &Value) {
        self.logger
            .error("upstream reported an error payload", Some(payload));
    }
}

/// Issues exactly one GET and normalizes the outcome into an envelope.
///
/// Every path produces an envelope: transport faults and unmappable
/// records collapse into a single synthetic internal error, non-200
/// statuses surface the upstream's own error list. The boolean is a fast
/// success check for callers that do not want to match on the envelope.
pub async fn invoke_request<T>(
    transport: &dyn UpstreamTransport,
    logger: &Logger,
    ctx: &RequestContext,
    url: &str,
    params: &[(String, String)],
    map_record: &(dyn Fn(&Value) -> Result<T, ToolError> + Sync),
    sink: Option<&dyn ErrorSink>,
) -> (Envelope<T>, bool) {
    let headers = build_headers(ctx);
    logger.info(
        "calling upstream",
        Some(&serde_json::json!({"url": url, "params": params_meta(params)})),
    );

    let reply = match transport.get(url, &headers, params).await {
        Ok(reply) => reply,
        Err(err) => {
            logger.error(
                "upstream request failed",
                Some(&serde_json::json!({
                    "url": url,
                    "params": params_meta(params),
                    "kind": err.kind,
                    "message": err.message,
                })),
            );
            return (Envelope::internal_error(), false);
        }
    };

    if reply.status != 200 {
        if let Some(sink) = sink {
            sink.report(&reply.body);
        }
        let errors = extract_errors(&reply.body);
        return (Envelope::Failure { errors }, false);
    }

    match extract_success(&reply.body, map_record) {
        Ok(envelope) => (envelope, true),
        Err(err) => {
            logger.error(
                "failed to map upstream response",
                Some(&serde_json::json!({
                    "url": url,
                    "kind": err.kind,
                    "message": err.message,
                })),
            );
            (Envelope::internal_error(), false)
        }
    }
}

/// Merges the three header sources: the fixed identifying header, the
/// ambient context headers, and the JSON content type. Context headers
/// win on collision.
fn build_headers(ctx: &RequestContext) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::from([
        (
            "content-type".to_string(),
            "application/json".to_string(),
        ),
        (
            env_string(
                "MCP_HEADER_NAME",
                header_constants::DEFAULT_MCP_HEADER_NAME,
            ),
            env_string(
                "MCP_HEADER_VALUE",
                header_constants::DEFAULT_MCP_HEADER_VALUE,
            ),
        ),
    ]);
    for (name, value) in &ctx.headers {
        headers.insert(name.clone(), value.clone());
    }
    headers
}

fn extract_success<T>(
    body: &Value,
    map_record: &(dyn Fn(&Value) -> Result<T, ToolError> + Sync),
) -> Result<Envelope<T>, ToolError> {
    let records = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| ToolError::mapping("response body has no 'data' array"))?;
    let meta = body
        .get("meta")
        .ok_or_else(|| ToolError::mapping("response body has no 'meta' object"))?;
    let links = body
        .get("links")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_else(Map::new);

    let mut data = Vec::with_capacity(records.len());
    for record in records {
        data.push(map_record(record)?);
    }
    Ok(Envelope::Success {
        data,
        meta: Meta::from_json(meta),
        links,
    })
}

/// Locates the upstream error list: top-level `errors` first, then the
/// nested `body.errors` some services wrap around it. Anything else gets
/// the synthetic internal error.
fn extract_errors(body: &Value) -> Vec<ApiError> {
    let raw = body
        .get("errors")
        .and_then(Value::as_array)
        .or_else(|| {
            body.get("body")
                .and_then(|inner| inner.get("errors"))
                .and_then(Value::as_array)
        });
    match raw {
        Some(items) => items.iter().map(ApiError::from_json).collect(),
        None => vec![ApiError::internal_error()],
    }
}

fn params_meta(params: &[(String, String)]) -> Value {
    Value::Object(
        params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}
