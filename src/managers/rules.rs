use crate::constants::upstream as upstream_constants;
use crate::errors::ToolError;
use crate::managers::upstream::{invoke_request, ErrorSink};
use crate::managers::{arg, push_int, push_int_list, push_str_list, ToolHandler};
use crate::model::{Envelope, Rule};
use crate::services::context::RequestContext;
use crate::services::logger::Logger;
use crate::services::transport::UpstreamTransport;
use crate::utils::env::{env_flag, env_string};
use crate::utils::params::{coerce_list, to_int};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Lists the custom rules attached to an account's sites.
pub struct RulesManager {
    logger: Logger,
    transport: Arc<dyn UpstreamTransport>,
    sink: Option<Arc<dyn ErrorSink>>,
}

#[derive(Debug, Default, PartialEq)]
struct RuleFilters {
    account_id: Option<i64>,
    site_ids: Option<Vec<i64>>,
    sub_accounts_ids: Option<Vec<i64>>,
    rules_ids: Option<Vec<i64>>,
    names: Option<Vec<String>>,
    categories: Option<Vec<String>>,
    page_num: Option<i64>,
    page_size: Option<i64>,
}

impl RuleFilters {
    fn from_args(args: &Value) -> Result<Self, ToolError> {
        Ok(Self {
            account_id: to_int(arg(args, "account_id"))?,
            site_ids: coerce_list(arg(args, "site_ids"))?,
            sub_accounts_ids: coerce_list(arg(args, "sub_accounts_ids"))?,
            rules_ids: coerce_list(arg(args, "rules_ids"))?,
            names: coerce_list(arg(args, "names"))?,
            categories: coerce_list(arg(args, "categories"))?,
            page_num: to_int(arg(args, "page_num"))?,
            page_size: to_int(arg(args, "page_size"))?,
        })
    }

    fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(account_id) = self.account_id.filter(|id| *id != 0) {
            // The rules service historically accepted the account filter
            // under a different name; the flag selects which one to send.
            let key = if env_flag("USE_CAID_ON_RULES", true) {
                "caid"
            } else {
                "accountId"
            };
            params.push((key.to_string(), account_id.to_string()));
        }
        push_int(&mut params, "page_num", self.page_num);
        push_int(&mut params, "page_size", self.page_size);
        push_int_list(&mut params, "siteIds", &self.site_ids);
        push_int_list(&mut params, "subAccIds", &self.sub_accounts_ids);
        push_str_list(&mut params, "names", &self.names);
        push_int_list(&mut params, "ruleIds", &self.rules_ids);
        push_str_list(&mut params, "categories", &self.categories);
        params
    }
}

impl RulesManager {
    pub fn new(
        logger: Logger,
        transport: Arc<dyn UpstreamTransport>,
        sink: Option<Arc<dyn ErrorSink>>,
    ) -> Self {
        Self {
            logger: logger.child("rules"),
            transport,
            sink,
        }
    }

    pub async fn fetch_rules(&self, args: &Value, ctx: &RequestContext) -> Envelope<Rule> {
        let logger = self.logger.with_trace(ctx.trace_id());
        logger.info(
            "fetching rules",
            Some(&serde_json::json!({
                "account_id": arg(args, "account_id"),
                "categories": arg(args, "categories"),
            })),
        );

        let filters = match RuleFilters::from_args(args) {
            Ok(filters) => filters,
            Err(err) => {
                logger.error(
                    "failed to parse rule filters",
                    Some(&serde_json::json!({"message": err.message})),
                );
                return Envelope::invalid_arguments();
            }
        };

        let url = format!(
            "{}{}",
            env_string("BASE_RULES_URL", upstream_constants::DEFAULT_RULES_BASE_URL),
            upstream_constants::RULES_PATH
        );
        let (envelope, _ok) = invoke_request(
            self.transport.as_ref(),
            &logger,
            ctx,
            &url,
            &filters.query_params(),
            &Rule::from_json,
            self.sink.as_deref(),
        )
        .await;
        envelope
    }
}

#[async_trait]
impl ToolHandler for RulesManager {
    async fn handle(&self, args: Value, ctx: &RequestContext) -> Result<Value, ToolError> {
        let envelope = self.fetch_rules(&args, ctx).await;
        serde_json::to_value(&envelope).map_err(|err| ToolError::internal(err.to_string()))
    }
}
