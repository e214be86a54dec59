use crate::errors::ToolError;
use crate::model::{opt_nested, require_bool, require_i64, require_str, require_string_like, value_as_i64};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionData {
    pub exception_type: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionAssetMapping {
    pub id: i64,
    pub policy_data_exceptions_id: i64,
    pub asset_id: i64,
    pub asset_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDataException {
    pub id: i64,
    pub policy_settings_id: i64,
    pub last_modified_by: i64,
    pub last_modified: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<ExceptionData>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_asset_mapping: Option<Vec<ExceptionAssetMapping>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continents: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "UrlPattern", default, skip_serializing_if = "Option::is_none")]
    pub url_pattern: Option<String>,
}

/// The payload of an ACL or allowlist setting. WAF-rule settings carry no
/// payload at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySettingData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ips: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<UrlEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySettings {
    pub id: i64,
    pub policy_id: i64,
    pub settings_action: String,
    pub policy_setting_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PolicySettingData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_data_exceptions: Option<Vec<PolicyDataException>>,
}

impl PolicySettings {
    pub fn from_json(record: &Value) -> Result<Self, ToolError> {
        Ok(Self {
            id: require_i64(record, "id")?,
            policy_id: require_i64(record, "policyId")?,
            settings_action: require_str(record, "settingsAction")?,
            policy_setting_type: require_str(record, "policySettingType")?,
            data: opt_nested(record, "data")?,
            policy_data_exceptions: opt_nested(record, "policyDataExceptions")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    pub id: i64,
    pub policy_id: i64,
    pub account_id: i64,
    pub asset_type: String,
}

/// Subaccount grants are numeric ids, except for the `"*"` wildcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubaccountId {
    Id(i64),
    Tag(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: i64,
    pub policy_type: String,
    pub name: String,
    pub account_id: i64,
    pub enabled: bool,
    pub description: String,
    pub last_modified: String,
    pub last_modified_by: i64,
    /// `None` when the upstream omitted the settings entirely (the
    /// non-extended listing); an empty list means "present but empty".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_settings: Option<Vec<PolicySettings>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_policy_config: Option<Vec<PolicyConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subaccount_ids: Option<Vec<SubaccountId>>,
}

impl Policy {
    pub fn from_json(record: &Value) -> Result<Self, ToolError> {
        let policy_settings = match record.get("policySettings") {
            None | Some(Value::Null) => None,
            Some(value) => Some(settings_list(value)?),
        };
        Ok(Self {
            id: require_i64(record, "id")?,
            policy_type: require_str(record, "policyType")?,
            name: require_str(record, "name")?,
            account_id: require_i64(record, "accountId")?,
            enabled: require_bool(record, "enabled")?,
            description: require_str(record, "description")?,
            last_modified: require_string_like(record, "lastModified")?,
            last_modified_by: require_i64(record, "lastModifiedBy")?,
            policy_settings,
            default_policy_config: opt_nested(record, "defaultPolicyConfig")?,
            assets_ids: asset_ids(record)?,
            subaccount_ids: opt_nested(record, "subaccountIds")?,
        })
    }
}

fn settings_list(value: &Value) -> Result<Vec<PolicySettings>, ToolError> {
    let items = value
        .as_array()
        .ok_or_else(|| ToolError::mapping("field 'policySettings' is not a list"))?;
    items.iter().map(PolicySettings::from_json).collect()
}

fn asset_ids(record: &Value) -> Result<Option<Vec<i64>>, ToolError> {
    match record.get("assetsIds") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let items = value
                .as_array()
                .ok_or_else(|| ToolError::mapping("field 'assetsIds' is not a list"))?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(value_as_i64(item).ok_or_else(|| {
                    ToolError::mapping("field 'assetsIds' holds a non-integer entry")
                })?);
            }
            Ok(Some(out))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_policy() -> Value {
        json!({
            "id": 5001,
            "policyType": "ACL",
            "name": "block-embargoed-geos",
            "accountId": 42,
            "enabled": true,
            "description": "Blocks traffic from embargoed regions",
            "lastModified": "1700000000000",
            "lastModifiedBy": 7
        })
    }

    #[test]
    fn omitted_settings_stay_none_but_empty_settings_stay_empty() {
        let omitted = Policy::from_json(&base_policy()).unwrap();
        assert_eq!(omitted.policy_settings, None);

        let mut with_empty = base_policy();
        with_empty
            .as_object_mut()
            .unwrap()
            .insert("policySettings".to_string(), json!([]));
        let present = Policy::from_json(&with_empty).unwrap();
        assert_eq!(present.policy_settings, Some(vec![]));
    }

    #[test]
    fn maps_nested_settings_and_exceptions() {
        let mut record = base_policy();
        record.as_object_mut().unwrap().insert(
            "policySettings".to_string(),
            json!([{
                "id": 1,
                "policyId": 5001,
                "settingsAction": "BLOCK",
                "policySettingType": "GEO",
                "data": {"geo": {"countries": ["KP"]}},
                "policyDataExceptions": [{
                    "id": 9,
                    "policySettingsId": 1,
                    "lastModifiedBy": 7,
                    "lastModified": "2024-01-01",
                    "comment": "allow monitoring probe",
                    "data": [{"exceptionType": "IP", "values": ["198.51.100.9"]}],
                    "exceptionAssetMapping": [{
                        "id": 3,
                        "policyDataExceptionsId": 9,
                        "assetId": 101,
                        "assetType": "WEBSITE"
                    }]
                }]
            }]),
        );
        let policy = Policy::from_json(&record).unwrap();
        let settings = policy.policy_settings.unwrap();
        assert_eq!(settings.len(), 1);
        let setting = &settings[0];
        assert_eq!(setting.settings_action, "BLOCK");
        assert_eq!(
            setting
                .data
                .as_ref()
                .and_then(|d| d.geo.as_ref())
                .and_then(|g| g.countries.as_ref())
                .map(|c| c.as_slice()),
            Some(["KP".to_string()].as_slice())
        );
        let exception = &setting.policy_data_exceptions.as_ref().unwrap()[0];
        assert_eq!(exception.comment.as_deref(), Some("allow monitoring probe"));
        assert_eq!(
            exception.exception_asset_mapping.as_ref().unwrap()[0].asset_id,
            101
        );
    }

    #[test]
    fn maps_default_config_and_id_lists() {
        let mut record = base_policy();
        let obj = record.as_object_mut().unwrap();
        obj.insert(
            "defaultPolicyConfig".to_string(),
            json!([{"id": 1, "policyId": 5001, "accountId": 42, "assetType": "WEBSITE"}]),
        );
        obj.insert("assetsIds".to_string(), json!([101, 102]));
        obj.insert("subaccountIds".to_string(), json!(["*"]));
        let policy = Policy::from_json(&record).unwrap();
        assert_eq!(policy.default_policy_config.unwrap()[0].asset_type, "WEBSITE");
        assert_eq!(policy.assets_ids, Some(vec![101, 102]));
        assert_eq!(
            policy.subaccount_ids,
            Some(vec![SubaccountId::Tag("*".to_string())])
        );
    }

    #[test]
    fn missing_required_field_fails_the_record() {
        let mut record = base_policy();
        record.as_object_mut().unwrap().remove("enabled");
        assert!(Policy::from_json(&record).is_err());
    }

    #[test]
    fn malformed_nested_setting_fails_the_record() {
        let mut record = base_policy();
        record.as_object_mut().unwrap().insert(
            "policySettings".to_string(),
            json!([{"id": 1, "policyId": 5001}]),
        );
        assert!(Policy::from_json(&record).is_err());
    }

    #[test]
    fn serialized_policy_omits_absent_collections() {
        let policy = Policy::from_json(&base_policy()).unwrap();
        let rendered = serde_json::to_value(&policy).unwrap();
        assert!(rendered.get("policySettings").is_none());
        assert!(rendered.get("defaultPolicyConfig").is_none());
        assert_eq!(rendered["policyType"], json!("ACL"));
        assert_eq!(rendered["lastModifiedBy"], json!(7));
    }
}
