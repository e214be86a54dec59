pub mod api_error;
pub mod domain;
pub mod envelope;
pub mod policy;
pub mod rule;
pub mod site;

pub use api_error::{ApiError, ErrorCodeValue};
pub use domain::SiteDomain;
pub use envelope::{Envelope, Meta};
pub use policy::{Policy, PolicyConfig, PolicySettings};
pub use rule::{BlockDurationDetails, Rule};
pub use site::Site;

use crate::errors::ToolError;
use serde::de::DeserializeOwned;
use serde_json::Value;

// Field extraction helpers shared by the record mappers. A `null` value is
// treated the same as an absent key: optional fields map to `None`,
// required fields fail the whole record.

pub(crate) fn require<'a>(record: &'a Value, key: &str) -> Result<&'a Value, ToolError> {
    match record.get(key) {
        Some(value) if !value.is_null() => Ok(value),
        _ => Err(ToolError::mapping(format!(
            "response record is missing '{}'",
            key
        ))),
    }
}

pub(crate) fn require_i64(record: &Value, key: &str) -> Result<i64, ToolError> {
    value_as_i64(require(record, key)?)
        .ok_or_else(|| ToolError::mapping(format!("field '{}' is not an integer", key)))
}

pub(crate) fn require_str(record: &Value, key: &str) -> Result<String, ToolError> {
    require(record, key)?
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| ToolError::mapping(format!("field '{}' is not a string", key)))
}

/// Like `require_str` but also accepts numbers, rendering them as text.
/// Upstream timestamps occasionally arrive as raw integers.
pub(crate) fn require_string_like(record: &Value, key: &str) -> Result<String, ToolError> {
    let value = require(record, key)?;
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ToolError::mapping(format!(
            "field '{}' is not a string",
            key
        ))),
    }
}

pub(crate) fn require_bool(record: &Value, key: &str) -> Result<bool, ToolError> {
    require(record, key)?
        .as_bool()
        .ok_or_else(|| ToolError::mapping(format!("field '{}' is not a boolean", key)))
}

pub(crate) fn opt_i64(record: &Value, key: &str) -> Result<Option<i64>, ToolError> {
    match record.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(None),
        Some(value) => value_as_i64(value)
            .map(Some)
            .ok_or_else(|| ToolError::mapping(format!("field '{}' is not an integer", key))),
    }
}

pub(crate) fn opt_str(record: &Value, key: &str) -> Result<Option<String>, ToolError> {
    match record.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| ToolError::mapping(format!("field '{}' is not a string", key))),
    }
}

pub(crate) fn opt_bool(record: &Value, key: &str) -> Result<Option<bool>, ToolError> {
    match record.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| ToolError::mapping(format!("field '{}' is not a boolean", key))),
    }
}

pub(crate) fn opt_string_vec(record: &Value, key: &str) -> Result<Option<Vec<String>>, ToolError> {
    match record.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let text = item.as_str().ok_or_else(|| {
                    ToolError::mapping(format!("field '{}' holds a non-string entry", key))
                })?;
                out.push(text.to_string());
            }
            Ok(Some(out))
        }
        Some(_) => Err(ToolError::mapping(format!(
            "field '{}' is not a list",
            key
        ))),
    }
}

/// Decodes an optional nested payload into a typed struct.
pub(crate) fn opt_nested<T: DeserializeOwned>(
    record: &Value,
    key: &str,
) -> Result<Option<T>, ToolError> {
    match record.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|err| {
            ToolError::mapping(format!("field '{}' has an unexpected shape: {}", key, err))
        }),
    }
}

pub(crate) fn value_as_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}
