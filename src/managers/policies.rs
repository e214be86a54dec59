use crate::constants::upstream as upstream_constants;
use crate::errors::ToolError;
use crate::managers::upstream::{invoke_request, ErrorSink};
use crate::managers::{arg, push_int, push_int_list, push_str_list, ToolHandler};
use crate::model::{Envelope, Policy};
use crate::services::context::RequestContext;
use crate::services::logger::Logger;
use crate::services::transport::UpstreamTransport;
use crate::utils::env::env_string;
use crate::utils::params::{coerce_list, to_bool, to_int};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Lists an account's policies. `extended` controls whether the upstream
/// inlines policy settings and default-policy configuration.
pub struct PoliciesManager {
    logger: Logger,
    transport: Arc<dyn UpstreamTransport>,
    sink: Option<Arc<dyn ErrorSink>>,
}

#[derive(Debug, PartialEq)]
struct PolicyFilters {
    account_id: Option<i64>,
    site_ids: Option<Vec<i64>>,
    sub_accounts_ids: Option<Vec<i64>>,
    policies_ids: Option<Vec<i64>>,
    policy_types: Option<Vec<String>>,
    names: Option<Vec<String>>,
    extended: bool,
    page_num: Option<i64>,
    page_size: Option<i64>,
}

impl PolicyFilters {
    fn from_args(args: &Value) -> Result<Self, ToolError> {
        Ok(Self {
            account_id: to_int(arg(args, "account_id"))?,
            site_ids: coerce_list(arg(args, "site_ids"))?,
            sub_accounts_ids: coerce_list(arg(args, "sub_accounts_ids"))?,
            policies_ids: coerce_list(arg(args, "policies_ids"))?,
            policy_types: coerce_list(arg(args, "policy_types"))?,
            names: coerce_list(arg(args, "names"))?,
            extended: to_bool(arg(args, "extended"))?.unwrap_or(true),
            page_num: to_int(arg(args, "page_num"))?,
            page_size: to_int(arg(args, "page_size"))?,
        })
    }

    fn query_params(&self) -> Vec<(String, String)> {
        // `extended` is exempt from the emptiness rules: it is always sent.
        let mut params = vec![("extended".to_string(), self.extended.to_string())];
        push_int(&mut params, "caid", self.account_id);
        push_int(&mut params, "page", self.page_num);
        push_int(&mut params, "size", self.page_size);
        push_int_list(&mut params, "assetIds", &self.site_ids);
        push_int_list(&mut params, "subAccIds", &self.sub_accounts_ids);
        push_str_list(&mut params, "names", &self.names);
        push_int_list(&mut params, "policyIds", &self.policies_ids);
        push_str_list(&mut params, "types", &self.policy_types);
        params
    }
}

impl PoliciesManager {
    pub fn new(
        logger: Logger,
        transport: Arc<dyn UpstreamTransport>,
        sink: Option<Arc<dyn ErrorSink>>,
    ) -> Self {
        Self {
            logger: logger.child("policies"),
            transport,
            sink,
        }
    }

    pub async fn fetch_policies(&self, args: &Value, ctx: &RequestContext) -> Envelope<Policy> {
        let logger = self.logger.with_trace(ctx.trace_id());
        logger.info(
            "fetching policies",
            Some(&serde_json::json!({
                "account_id": arg(args, "account_id"),
                "policy_types": arg(args, "policy_types"),
            })),
        );

        let filters = match PolicyFilters::from_args(args) {
            Ok(filters) => filters,
            Err(err) => {
                logger.error(
                    "failed to parse policy filters",
                    Some(&serde_json::json!({"message": err.message})),
                );
                return Envelope::invalid_arguments();
            }
        };

        let url = format!(
            "{}{}",
            env_string(
                "BASE_POLICIES_URL",
                upstream_constants::DEFAULT_POLICIES_BASE_URL
            ),
            upstream_constants::POLICIES_PATH
        );
        let (envelope, _ok) = invoke_request(
            self.transport.as_ref(),
            &logger,
            ctx,
            &url,
            &filters.query_params(),
            &Policy::from_json,
            self.sink.as_deref(),
        )
        .await;
        envelope
    }
}

#[async_trait]
impl ToolHandler for PoliciesManager {
    async fn handle(&self, args: Value, ctx: &RequestContext) -> Result<Value, ToolError> {
        let envelope = self.fetch_policies(&args, ctx).await;
        serde_json::to_value(&envelope).map_err(|err| ToolError::internal(err.to_string()))
    }
}
