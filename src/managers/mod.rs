pub mod domains;
pub mod policies;
pub mod rules;
pub mod sites;
pub mod upstream;

use crate::errors::ToolError;
use crate::services::context::RequestContext;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, args: Value, ctx: &RequestContext) -> Result<Value, ToolError>;
}

pub(crate) fn arg<'a>(args: &'a Value, key: &str) -> &'a Value {
    args.get(key).unwrap_or(&Value::Null)
}

// Query-parameter assembly shared by the tool managers. A parameter is
// included only when its coerced value is non-empty and non-zero; list
// values are serialized comma-joined.

pub(crate) fn push_int(params: &mut Vec<(String, String)>, key: &str, value: Option<i64>) {
    if let Some(value) = value {
        if value != 0 {
            params.push((key.to_string(), value.to_string()));
        }
    }
}

pub(crate) fn push_int_list(
    params: &mut Vec<(String, String)>,
    key: &str,
    values: &Option<Vec<i64>>,
) {
    if let Some(values) = values {
        if !values.is_empty() {
            let joined = values
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(",");
            params.push((key.to_string(), joined));
        }
    }
}

pub(crate) fn push_str_list(
    params: &mut Vec<(String, String)>,
    key: &str,
    values: &Option<Vec<String>>,
) {
    if let Some(values) = values {
        if !values.is_empty() {
            params.push((key.to_string(), values.join(",")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_none_integers_are_omitted() {
        let mut params = Vec::new();
        push_int(&mut params, "page", None);
        push_int(&mut params, "size", Some(0));
        push_int(&mut params, "caid", Some(42));
        assert_eq!(params, vec![("caid".to_string(), "42".to_string())]);
    }

    #[test]
    fn empty_lists_are_omitted_and_full_lists_comma_join() {
        let mut params = Vec::new();
        push_int_list(&mut params, "siteIds", &Some(vec![]));
        push_int_list(&mut params, "ruleIds", &Some(vec![1, 2]));
        push_str_list(&mut params, "names", &None);
        push_str_list(&mut params, "categories", &Some(vec!["Rates".to_string()]));
        assert_eq!(
            params,
            vec![
                ("ruleIds".to_string(), "1,2".to_string()),
                ("categories".to_string(), "Rates".to_string()),
            ]
        );
    }
}
