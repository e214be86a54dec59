use crate::constants::upstream as upstream_constants;
use crate::errors::ToolError;
use crate::managers::upstream::{invoke_request, ErrorSink};
use crate::managers::{arg, push_int, push_int_list, push_str_list, ToolHandler};
use crate::model::{Envelope, SiteDomain};
use crate::services::context::RequestContext;
use crate::services::logger::Logger;
use crate::services::transport::UpstreamTransport;
use crate::utils::env::env_string;
use crate::utils::params::{coerce_list, to_int};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Lists the domains attached to an account's sites.
pub struct DomainsManager {
    logger: Logger,
    transport: Arc<dyn UpstreamTransport>,
    sink: Option<Arc<dyn ErrorSink>>,
}

#[derive(Debug, Default, PartialEq)]
struct DomainFilters {
    account_id: Option<i64>,
    domain_ids: Option<Vec<i64>>,
    site_ids: Option<Vec<i64>>,
    names: Option<Vec<String>>,
    page_num: Option<i64>,
    page_size: Option<i64>,
}

impl DomainFilters {
    fn from_args(args: &Value) -> Result<Self, ToolError> {
        Ok(Self {
            account_id: to_int(arg(args, "account_id"))?,
            domain_ids: coerce_list(arg(args, "domain_ids"))?,
            site_ids: coerce_list(arg(args, "site_ids"))?,
            names: coerce_list(arg(args, "names"))?,
            page_num: to_int(arg(args, "page_num"))?,
            page_size: to_int(arg(args, "page_size"))?,
        })
    }

    fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        push_int(&mut params, "caid", self.account_id);
        push_int_list(&mut params, "siteIds", &self.site_ids);
        push_int_list(&mut params, "domainIds", &self.domain_ids);
        push_str_list(&mut params, "names", &self.names);
        push_int(&mut params, "page", self.page_num);
        push_int(&mut params, "size", self.page_size);
        params
    }
}

impl DomainsManager {
    pub fn new(
        logger: Logger,
        transport: Arc<dyn UpstreamTransport>,
        sink: Option<Arc<dyn ErrorSink>>,
    ) -> Self {
        Self {
            logger: logger.child("domains"),
            transport,
            sink,
        }
    }

    pub async fn fetch_domains(&self, args: &Value, ctx: &RequestContext) -> Envelope<SiteDomain> {
        let logger = self.logger.with_trace(ctx.trace_id());
        logger.info(
            "fetching domains",
            Some(&serde_json::json!({"account_id": arg(args, "account_id")})),
        );

        let filters = match DomainFilters::from_args(args) {
            Ok(filters) => filters,
            Err(err) => {
                logger.error(
                    "failed to parse domain filters",
                    Some(&serde_json::json!({"message": err.message})),
                );
                return Envelope::invalid_arguments();
            }
        };

        let url = format!(
            "{}{}",
            env_string(
                "BASE_DOMAINS_URL",
                upstream_constants::DEFAULT_DOMAINS_BASE_URL
            ),
            upstream_constants::DOMAINS_PATH
        );
        let (envelope, _ok) = invoke_request(
            self.transport.as_ref(),
            &logger,
            ctx,
            &url,
            &filters.query_params(),
            &SiteDomain::from_json,
            self.sink.as_deref(),
        )
        .await;
        envelope
    }
}

#[async_trait]
impl ToolHandler for DomainsManager {
    async fn handle(&self, args: Value, ctx: &RequestContext) -> Result<Value, ToolError> {
        let envelope = self.fetch_domains(&args, ctx).await;
        serde_json::to_value(&envelope).map_err(|err| ToolError::internal(err.to_string()))
    }
}
