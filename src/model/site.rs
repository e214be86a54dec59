use crate::errors::ToolError;
use crate::model::{opt_bool, opt_str, opt_string_vec, require_bool, require_i64, require_str};
use crate::utils::time::epoch_millis_to_utc;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One protected site as reported by the site-management service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: i64,
    pub name: String,
    pub account_id: i64,
    #[serde(rename = "type")]
    pub site_type: String,
    pub active: bool,
    /// Creation instant, rendered as a UTC display string.
    pub creation_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnames: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default_site: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_keys: Option<Vec<String>>,
}

impl Site {
    pub fn from_json(record: &Value) -> Result<Self, ToolError> {
        let creation_millis = require_i64(record, "creationTime")?;
        Ok(Self {
            id: require_i64(record, "id")?,
            name: require_str(record, "name")?,
            account_id: require_i64(record, "accountId")?,
            site_type: require_str(record, "type")?,
            active: require_bool(record, "active")?,
            creation_time: epoch_millis_to_utc(creation_millis)?,
            ref_id: opt_str(record, "refId")?,
            cnames: opt_str(record, "cname")?,
            attributes: attributes_map(record)?,
            site_status: opt_str(record, "siteStatus")?,
            is_default_site: opt_bool(record, "isDefaultSite")?,
            deployment_keys: opt_string_vec(record, "deploymentKeys")?,
        })
    }
}

fn attributes_map(record: &Value) -> Result<Option<BTreeMap<String, String>>, ToolError> {
    match record.get("attributes") {
        None => Ok(None),
        Some(Value::Null) => Ok(None),
        Some(value) => {
            let obj = value
                .as_object()
                .ok_or_else(|| ToolError::mapping("field 'attributes' is not an object"))?;
            let mut out = BTreeMap::new();
            for (key, val) in obj {
                let text = val.as_str().ok_or_else(|| {
                    ToolError::mapping("field 'attributes' holds a non-string value")
                })?;
                out.insert(key.clone(), text.to_string());
            }
            Ok(Some(out))
        }
    }
}
