use crate::constants::network as network_constants;
use crate::errors::ToolError;
use crate::utils::env::{env_flag, env_u64};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Status and decoded body of one upstream response. Interpretation of
/// the status and the body shape is the orchestrator's job.
#[derive(Debug, Clone)]
pub struct TransportReply {
    pub status: u16,
    pub body: Value,
}

/// The outbound HTTP seam. Production wires a pooled reqwest client;
/// tests substitute stubs. Implementations own pooling, TLS, and timeout
/// policy; callers only see a status plus decoded JSON.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
        query: &[(String, String)],
    ) -> Result<TransportReply, ToolError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds the shared pooled client. Pool and timeout settings come
    /// from the environment with the defaults in `constants::network`.
    pub fn from_env() -> Result<Self, ToolError> {
        let read_timeout = env_u64("READ_TIMEOUT_MS", network_constants::READ_TIMEOUT_MS);
        let connect_timeout = env_u64("CONNECT_TIMEOUT_MS", network_constants::CONNECT_TIMEOUT_MS);
        let max_idle = env_u64(
            "CONNECTION_POOL_MAX_KEEP_ALIVE",
            network_constants::POOL_MAX_IDLE_PER_HOST,
        );

        let mut builder = Client::builder()
            .timeout(Duration::from_millis(read_timeout))
            .connect_timeout(Duration::from_millis(connect_timeout))
            .pool_max_idle_per_host(max_idle as usize)
            .pool_idle_timeout(Duration::from_millis(
                network_constants::POOL_IDLE_TIMEOUT_MS,
            ));
        if env_flag("DISABLE_SSL_VERIFICATION", false) {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder
            .build()
            .map_err(|err| ToolError::internal(format!("failed to build HTTP client: {}", err)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl UpstreamTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
        query: &[(String, String)],
    ) -> Result<TransportReply, ToolError> {
        let parsed = Url::parse(url)
            .map_err(|err| ToolError::transport(format!("invalid upstream URL '{}': {}", url, err)))?;
        let response = self
            .client
            .get(parsed)
            .headers(build_header_map(headers)?)
            .query(query)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response
            .json::<Value>()
            .await
            .map_err(|err| ToolError::transport(format!("response body is not JSON: {}", err)))?;
        Ok(TransportReply { status, body })
    }
}

fn build_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ToolError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ToolError::internal(format!("invalid header name '{}'", name)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| ToolError::internal(format!("invalid value for header '{}'", name)))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn map_reqwest_error(err: reqwest::Error) -> ToolError {
    if err.is_timeout() {
        return ToolError::timeout("upstream request timed out");
    }
    ToolError::transport(err.to_string())
}
