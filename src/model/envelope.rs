use crate::model::api_error::ApiError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Pagination descriptor. Not every upstream response carries every field,
/// so each one stands on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(rename = "totalElements", skip_serializing_if = "Option::is_none")]
    pub total_elements: Option<i64>,
    #[serde(rename = "totalPages", skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,
}

impl Meta {
    pub fn from_json(raw: &Value) -> Self {
        Self {
            page: raw.get("page").and_then(Value::as_i64),
            size: raw.get("size").and_then(Value::as_i64),
            total_elements: raw.get("totalElements").and_then(Value::as_i64),
            total_pages: raw.get("totalPages").and_then(Value::as_i64),
        }
    }
}

/// The result shape every tool returns: mapped records with pagination
/// metadata, or a list of upstream errors. Exactly one of the two per
/// call, enforced by construction.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Success {
        data: Vec<T>,
        meta: Meta,
        links: Map<String, Value>,
    },
    Failure {
        errors: Vec<ApiError>,
    },
}

impl<T> Envelope<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    /// Error envelope for arguments that failed coercion. The upstream is
    /// never contacted in this case.
    pub fn invalid_arguments() -> Self {
        Envelope::Failure {
            errors: vec![ApiError::bad_request()],
        }
    }

    /// Error envelope for transport faults, mapping faults, and
    /// unrecognized upstream error shapes.
    pub fn internal_error() -> Self {
        Envelope::Failure {
            errors: vec![ApiError::internal_error()],
        }
    }
}
