use crate::errors::ToolError;
use crate::managers::domains::DomainsManager;
use crate::managers::policies::PoliciesManager;
use crate::managers::rules::RulesManager;
use crate::managers::sites::SitesManager;
use crate::managers::upstream::{ErrorSink, LoggingErrorSink};
use crate::managers::ToolHandler;
use crate::mcp::catalog::tool_catalog;
use crate::services::context::ApiKeyAuth;
use crate::services::logger::Logger;
use crate::services::transport::{ReqwestTransport, UpstreamTransport};
use std::collections::HashMap;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub auth: ApiKeyAuth,
    pub handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl App {
    fn validate_tool_wiring(
        handlers: &HashMap<String, Arc<dyn ToolHandler>>,
    ) -> Result<(), ToolError> {
        let mut missing = Vec::new();
        for tool in tool_catalog().iter() {
            if !handlers.contains_key(&tool.name) {
                missing.push(tool.name.clone());
            }
        }
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        Err(
            ToolError::internal("Tool wiring is incomplete").with_details(
                serde_json::json!({ "missing_tools": missing }),
            ),
        )
    }

    pub fn initialize() -> Result<Self, ToolError> {
        let logger = Logger::new("cwaf-mcp");
        let auth = ApiKeyAuth::from_env()?;
        let transport: Arc<dyn UpstreamTransport> = Arc::new(ReqwestTransport::from_env()?);
        let sink: Arc<dyn ErrorSink> = Arc::new(LoggingErrorSink::new(logger.clone()));

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert(
            "get_sites_details_of_a_given_account_tool".to_string(),
            Arc::new(SitesManager::new(
                logger.clone(),
                transport.clone(),
                Some(sink.clone()),
            )),
        );
        handlers.insert(
            "get_domains_by_filters_tool".to_string(),
            Arc::new(DomainsManager::new(
                logger.clone(),
                transport.clone(),
                Some(sink.clone()),
            )),
        );
        handlers.insert(
            "get_polices_of_account_by_filter_tool".to_string(),
            Arc::new(PoliciesManager::new(
                logger.clone(),
                transport.clone(),
                Some(sink.clone()),
            )),
        );
        handlers.insert(
            "get_rules_of_account_tool".to_string(),
            Arc::new(RulesManager::new(
                logger.clone(),
                transport.clone(),
                Some(sink.clone()),
            )),
        );

        Self::validate_tool_wiring(&handlers)?;

        Ok(Self {
            logger,
            auth,
            handlers,
        })
    }
}
