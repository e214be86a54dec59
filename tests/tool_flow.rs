mod common;
use common::ENV_LOCK;

use async_trait::async_trait;
use cwaf_mcp::errors::ToolError;
use cwaf_mcp::managers::domains::DomainsManager;
use cwaf_mcp::managers::policies::PoliciesManager;
use cwaf_mcp::managers::rules::RulesManager;
use cwaf_mcp::managers::sites::SitesManager;
use cwaf_mcp::managers::ToolHandler;
use cwaf_mcp::services::context::{ApiKeyAuth, RequestContext};
use cwaf_mcp::services::logger::Logger;
use cwaf_mcp::services::transport::{TransportReply, UpstreamTransport};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

struct RecordedCall {
    url: String,
    headers: BTreeMap<String, String>,
    query: Vec<(String, String)>,
}

struct StubTransport {
    reply: Result<TransportReply, ToolError>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubTransport {
    fn replying(status: u16, body: Value) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(TransportReply { status, body }),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(err: ToolError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(err),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn last_call<T>(&self, pick: impl Fn(&RecordedCall) -> T) -> T {
        let calls = self.calls.lock().unwrap();
        pick(calls.last().expect("transport was never called"))
    }
}

#[async_trait]
impl UpstreamTransport for StubTransport {
    async fn get(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
        query: &[(String, String)],
    ) -> Result<TransportReply, ToolError> {
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            headers: headers.clone(),
            query: query.to_vec(),
        });
        self.reply.clone()
    }
}

fn test_ctx() -> RequestContext {
    RequestContext::new("trace-test", ApiKeyAuth::new(123, "abc").ambient_headers())
}

fn restore_env(key: &str, previous: Option<String>) {
    match previous {
        Some(value) => std::env::set_var(key, value),
        None => std::env::remove_var(key),
    }
}

fn rule_record(rule_id: i64, name: &str) -> Value {
    json!({
        "site_id": 101,
        "account_id": 1,
        "rule": {
            "rule_id": rule_id,
            "name": name,
            "action": "RULE_ACTION_BLOCK",
            "enabled": true
        }
    })
}

#[tokio::test]
async fn rules_query_success_end_to_end() {
    let _guard = ENV_LOCK.lock().await;

    let transport = StubTransport::replying(
        200,
        json!({
            "data": [rule_record(1, "block-bots"), rule_record(2, "block-scrapers")],
            "meta": {"page": 0, "size": 100, "totalElements": 2, "totalPages": 1},
            "links": {"self": "https://upstream/v3/rules?page_num=0"}
        }),
    );
    let manager = RulesManager::new(Logger::new("test"), transport.clone(), None);

    let result = manager
        .handle(json!({"account_id": 1, "rules_ids": "1,2"}), &test_ctx())
        .await
        .unwrap();

    assert_eq!(transport.call_count(), 1);
    assert!(transport.last_call(|c| c.url.ends_with("/v3/rules")));
    assert_eq!(
        transport.last_call(|c| c.query.clone()),
        vec![
            ("caid".to_string(), "1".to_string()),
            ("ruleIds".to_string(), "1,2".to_string()),
        ]
    );

    let data = result["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["rule_id"], json!(1));
    assert_eq!(data[0]["name"], json!("block-bots"));
    assert_eq!(result["meta"], json!({"page": 0, "size": 100, "totalElements": 2, "totalPages": 1}));
    assert!(result.get("errors").is_none());
}

#[tokio::test]
async fn rules_query_forbidden_end_to_end() {
    let _guard = ENV_LOCK.lock().await;

    let transport = StubTransport::replying(
        403,
        json!({"errors": [{"status": 403, "title": "Forbidden"}]}),
    );
    let manager = RulesManager::new(Logger::new("test"), transport.clone(), None);

    let result = manager
        .handle(json!({"account_id": 1, "rules_ids": "1,2"}), &test_ctx())
        .await
        .unwrap();

    assert!(result.get("data").is_none());
    assert_eq!(
        result["errors"],
        json!([{"status": 403, "title": "Forbidden"}])
    );
}

#[tokio::test]
async fn invalid_arguments_never_reach_the_transport() {
    let _guard = ENV_LOCK.lock().await;

    let transport = StubTransport::replying(200, json!({"data": [], "meta": {}}));
    let manager = RulesManager::new(Logger::new("test"), transport.clone(), None);

    let result = manager
        .handle(json!({"account_id": "abc"}), &test_ctx())
        .await
        .unwrap();

    assert_eq!(transport.call_count(), 0);
    assert_eq!(
        result["errors"],
        json!([{
            "code": 400,
            "title": "Bad Request",
            "detail": "Invalid tool arguments"
        }])
    );
}

#[tokio::test]
async fn transport_failure_becomes_the_internal_error_envelope() {
    let _guard = ENV_LOCK.lock().await;

    let transport = StubTransport::failing(ToolError::transport("connection refused"));
    let manager = SitesManager::new(Logger::new("test"), transport.clone(), None);

    let result = manager
        .handle(json!({"account_id": 42}), &test_ctx())
        .await
        .unwrap();

    assert_eq!(
        result["errors"],
        json!([{"status": 500, "title": "internal error", "detail": ""}])
    );
}

#[tokio::test]
async fn outbound_headers_carry_credentials_and_identifier() {
    let _guard = ENV_LOCK.lock().await;

    let transport = StubTransport::replying(200, json!({"data": [], "meta": {}}));
    let manager = DomainsManager::new(Logger::new("test"), transport.clone(), None);

    let _ = manager.handle(json!({"account_id": 1}), &test_ctx()).await;

    let headers = transport.last_call(|c| c.headers.clone());
    assert_eq!(
        headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
    assert_eq!(headers.get("x-mcp-cwaf").map(String::as_str), Some("cwaf-mcp"));
    assert_eq!(headers.get("x-api-id").map(String::as_str), Some("123"));
    assert_eq!(headers.get("x-api-key").map(String::as_str), Some("abc"));
}

#[tokio::test]
async fn identifying_header_responds_to_env_overrides() {
    let _guard = ENV_LOCK.lock().await;

    let prev_name = std::env::var("MCP_HEADER_NAME").ok();
    let prev_value = std::env::var("MCP_HEADER_VALUE").ok();
    std::env::set_var("MCP_HEADER_NAME", "x-gateway-tag");
    std::env::set_var("MCP_HEADER_VALUE", "edge-proxy");

    let transport = StubTransport::replying(200, json!({"data": [], "meta": {}}));
    let manager = DomainsManager::new(Logger::new("test"), transport.clone(), None);
    let _ = manager.handle(json!({}), &test_ctx()).await;

    let headers = transport.last_call(|c| c.headers.clone());
    assert_eq!(
        headers.get("x-gateway-tag").map(String::as_str),
        Some("edge-proxy")
    );
    assert!(!headers.contains_key("x-mcp-cwaf"));

    restore_env("MCP_HEADER_NAME", prev_name);
    restore_env("MCP_HEADER_VALUE", prev_value);
}

#[tokio::test]
async fn rules_account_filter_key_responds_to_the_caid_flag() {
    let _guard = ENV_LOCK.lock().await;

    let prev = std::env::var("USE_CAID_ON_RULES").ok();
    std::env::set_var("USE_CAID_ON_RULES", "false");

    let transport = StubTransport::replying(200, json!({"data": [], "meta": {}}));
    let manager = RulesManager::new(Logger::new("test"), transport.clone(), None);
    let _ = manager.handle(json!({"account_id": 7}), &test_ctx()).await;

    assert_eq!(
        transport.last_call(|c| c.query.clone()),
        vec![("accountId".to_string(), "7".to_string())]
    );

    restore_env("USE_CAID_ON_RULES", prev);
}

#[tokio::test]
async fn sites_success_maps_records_through_the_handler() {
    let _guard = ENV_LOCK.lock().await;

    let transport = StubTransport::replying(
        200,
        json!({
            "data": [{
                "id": 101,
                "name": "storefront",
                "accountId": 42,
                "type": "CWAF",
                "active": true,
                "creationTime": 1_700_000_000_000i64,
                "cname": "abc.cloudwafcdn.net",
                "siteStatus": "CONFIGURED"
            }],
            "meta": {"page": 0, "size": 10},
            "links": {}
        }),
    );
    let manager = SitesManager::new(Logger::new("test"), transport.clone(), None);

    let result = manager
        .handle(json!({"account_id": 42, "names": "storefront"}), &test_ctx())
        .await
        .unwrap();

    assert!(transport.last_call(|c| c.url.ends_with("/v3/sites/extended")));
    assert_eq!(
        transport.last_call(|c| c.query.clone()),
        vec![
            ("caid".to_string(), "42".to_string()),
            ("names".to_string(), "storefront".to_string()),
        ]
    );
    let site = &result["data"][0];
    assert_eq!(site["creationTime"], json!("2023-11-14 22:13:20"));
    assert_eq!(site["cnames"], json!("abc.cloudwafcdn.net"));
    assert!(site.get("attributes").is_none());
}

#[tokio::test]
async fn policies_distinguish_omitted_from_empty_settings() {
    let _guard = ENV_LOCK.lock().await;

    fn policy(id: i64) -> Value {
        json!({
            "id": id,
            "policyType": "ACL",
            "name": "acl-policy",
            "accountId": 42,
            "enabled": true,
            "description": "d",
            "lastModified": "1700000000000",
            "lastModifiedBy": 7
        })
    }
    let mut with_empty = policy(2);
    with_empty
        .as_object_mut()
        .unwrap()
        .insert("policySettings".to_string(), json!([]));

    let transport = StubTransport::replying(
        200,
        json!({"data": [policy(1), with_empty], "meta": {}}),
    );
    let manager = PoliciesManager::new(Logger::new("test"), transport.clone(), None);

    let result = manager.handle(json!({"account_id": 42}), &test_ctx()).await.unwrap();

    assert_eq!(
        transport.last_call(|c| c.query.clone()),
        vec![
            ("extended".to_string(), "true".to_string()),
            ("caid".to_string(), "42".to_string()),
        ]
    );
    let data = result["data"].as_array().unwrap();
    assert!(data[0].get("policySettings").is_none());
    assert_eq!(data[1]["policySettings"], json!([]));
}

#[tokio::test]
async fn bad_upstream_record_fails_the_whole_call() {
    let _guard = ENV_LOCK.lock().await;

    let transport = StubTransport::replying(
        200,
        json!({
            "data": [rule_record(1, "ok"), {"site_id": 1, "account_id": 1}],
            "meta": {}
        }),
    );
    let manager = RulesManager::new(Logger::new("test"), transport.clone(), None);

    let result = manager.handle(json!({"account_id": 1}), &test_ctx()).await.unwrap();

    assert!(result.get("data").is_none());
    assert_eq!(
        result["errors"],
        json!([{"status": 500, "title": "internal error", "detail": ""}])
    );
}
