use crate::errors::ToolError;
use crate::model::{opt_bool, opt_i64, opt_nested, opt_str, require, require_bool, require_i64, require_str};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDurationDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_randomized_duration_max_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_randomized_duration_min_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_fixed_duration_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_duration_period_type: Option<String>,
}

/// One site rule, flattened across the seven rule categories (forward,
/// WAF override, rates, redirect, rewrite-port, rewrite, security, custom
/// error response). Only the fields belonging to the rule's actual
/// category are populated; everything else stays absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub rule_id: i64,
    pub site_id: i64,
    pub account_id: i64,
    pub name: String,
    pub action: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    // forward
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dc_id: Option<i64>,
    // WAF override
    #[serde(rename = "overrideWafRule", skip_serializing_if = "Option::is_none")]
    pub override_waf_rule: Option<String>,
    #[serde(rename = "overrideWafAction", skip_serializing_if = "Option::is_none")]
    pub override_waf_action: Option<String>,
    // rates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_context: Option<String>,
    // redirect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_code: Option<i64>,
    // rewrite port
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_forwarding_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_forwarding_context: Option<String>,
    // rewrite
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_deletions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewrite_existing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_missing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewrite_name: Option<String>,
    // security
    #[serde(rename = "sendNotifications", skip_serializing_if = "Option::is_none")]
    pub send_notifications: Option<bool>,
    #[serde(rename = "blockDurationDetails", skip_serializing_if = "Option::is_none")]
    pub block_duration_details: Option<BlockDurationDetails>,
    // custom error response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_response_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_response_format: Option<String>,
}

impl Rule {
    /// Upstream nests the rule body under a `rule` key beside the owning
    /// site and account ids.
    pub fn from_json(record: &Value) -> Result<Self, ToolError> {
        let body = require(record, "rule")?;
        Ok(Self {
            rule_id: require_i64(body, "rule_id")?,
            site_id: require_i64(record, "site_id")?,
            account_id: require_i64(record, "account_id")?,
            name: require_str(body, "name")?,
            action: require_str(body, "action")?,
            enabled: require_bool(body, "enabled")?,
            filter: opt_str(body, "filter")?,
            dc_id: opt_i64(body, "dcId")?,
            override_waf_rule: opt_str(body, "overrideWafRule")?,
            override_waf_action: opt_str(body, "overrideWafAction")?,
            rate_interval: opt_i64(body, "rateInterval")?,
            rate_context: opt_str(body, "rateContext")?,
            to_url: opt_str(body, "to")?,
            from_url: opt_str(body, "from")?,
            response_code: opt_i64(body, "responseCode")?,
            port_forwarding_value: opt_str(body, "portForwardingValue")?,
            port_forwarding_context: opt_str(body, "portForwardingContext")?,
            multiple_deletions: opt_bool(body, "multipleDeletions")?,
            rewrite_existing: opt_bool(body, "rewriteExisting")?,
            add_missing: opt_bool(body, "addMissing")?,
            rewrite_name: opt_str(body, "rewriteName")?,
            send_notifications: opt_bool(body, "sendNotifications")?,
            block_duration_details: opt_nested(body, "blockDurationDetails")?,
            error_response_data: opt_str(body, "errorResponseData")?,
            error_response_format: opt_str(body, "errorResponseFormat")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wrap(body: Value) -> Value {
        json!({"site_id": 101, "account_id": 42, "rule": body})
    }

    #[test]
    fn maps_a_redirect_rule_without_touching_other_categories() {
        let rule = Rule::from_json(&wrap(json!({
            "rule_id": 1,
            "name": "www-redirect",
            "action": "RULE_ACTION_REDIRECT",
            "enabled": true,
            "filter": "URL == \"/old\"",
            "to": "https://example.org/new",
            "from": "https://example.org/old",
            "responseCode": 301
        })))
        .unwrap();
        assert_eq!(rule.to_url.as_deref(), Some("https://example.org/new"));
        assert_eq!(rule.response_code, Some(301));
        assert_eq!(rule.dc_id, None);
        assert_eq!(rule.rate_interval, None);
        assert_eq!(rule.block_duration_details, None);
    }

    #[test]
    fn maps_a_security_rule_with_block_duration() {
        let rule = Rule::from_json(&wrap(json!({
            "rule_id": 2,
            "name": "block-scrapers",
            "action": "RULE_ACTION_BLOCK",
            "enabled": true,
            "sendNotifications": true,
            "blockDurationDetails": {
                "blockDurationPeriodType": "fixed",
                "blockFixedDurationValue": 600
            }
        })))
        .unwrap();
        assert_eq!(rule.send_notifications, Some(true));
        let details = rule.block_duration_details.unwrap();
        assert_eq!(details.block_duration_period_type.as_deref(), Some("fixed"));
        assert_eq!(details.block_fixed_duration_value, Some(600));
        assert_eq!(details.block_randomized_duration_max_value, None);
    }

    #[test]
    fn missing_rule_body_fails_the_record() {
        assert!(Rule::from_json(&json!({"site_id": 1, "account_id": 2})).is_err());
    }

    #[test]
    fn missing_base_field_fails_the_record() {
        let result = Rule::from_json(&wrap(json!({
            "rule_id": 3,
            "name": "nameless-action",
            "enabled": true
        })));
        assert!(result.is_err());
    }

    #[test]
    fn serialization_drops_irrelevant_fields() {
        let rule = Rule::from_json(&wrap(json!({
            "rule_id": 4,
            "name": "forward-eu",
            "action": "RULE_ACTION_FORWARD",
            "enabled": false,
            "dcId": 77
        })))
        .unwrap();
        let rendered = serde_json::to_value(&rule).unwrap();
        assert_eq!(rendered["dc_id"], json!(77));
        assert_eq!(rendered["enabled"], json!(false));
        assert!(rendered.get("to_url").is_none());
        assert!(rendered.get("overrideWafRule").is_none());
        assert!(rendered.get("sendNotifications").is_none());
    }
}
