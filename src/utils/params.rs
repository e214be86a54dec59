//! Coercion of loosely-typed tool arguments into scalars and lists.
//!
//! Tool callers hand us values in whatever shape their runtime produced:
//! native JSON arrays, CSV strings, JSON arrays wrapped in one or more
//! layers of string encoding, tokens wrapped in backticks or quotes. The
//! functions here collapse all of those into one deterministic result.

use crate::errors::ToolError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static TOKEN_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,\s]+").expect("valid regex"));

/// Maximum number of string-encoding layers peeled off a JSON-ish value.
const MAX_JSON_PEELS: usize = 3;

/// A scalar that can be produced from one trimmed token.
pub trait CastFrom: Sized {
    fn cast(token: &str) -> Result<Self, ToolError>;
}

impl CastFrom for i64 {
    fn cast(token: &str) -> Result<Self, ToolError> {
        token.trim().parse::<i64>().map_err(|_| {
            ToolError::invalid_params(format!("expected an integer, got '{}'", token))
        })
    }
}

impl CastFrom for String {
    fn cast(token: &str) -> Result<Self, ToolError> {
        Ok(token.to_string())
    }
}

/// `null` or blank string become `None`; numbers pass through (floats
/// truncate); numeric strings parse. Everything else is a caller error.
pub fn to_int(value: &Value) -> Result<Option<i64>, ToolError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| ToolError::invalid_params(format!("expected an integer, got {}", n))),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            i64::cast(trimmed).map(Some)
        }
        other => Err(ToolError::invalid_params(format!(
            "expected an integer, got {}",
            type_name(other)
        ))),
    }
}

/// `null` becomes `None`; booleans pass through; numbers collapse to their
/// truthiness; strings are matched case-insensitively against the accepted
/// true/false tokens.
pub fn to_bool(value: &Value) -> Result<Option<bool>, ToolError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        Value::Number(n) => Ok(Some(n.as_f64().map(|f| f != 0.0).unwrap_or(true))),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "y" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "n" | "off" => Ok(Some(false)),
            _ => Err(ToolError::invalid_params(format!(
                "cannot parse boolean from '{}'",
                s
            ))),
        },
        other => Err(ToolError::invalid_params(format!(
            "expected a boolean, got {}",
            type_name(other)
        ))),
    }
}

/// `null` becomes `None`; anything else is rendered, trimmed, stripped of
/// surrounding backticks, and dropped if empty.
pub fn to_str(value: &Value) -> Option<String> {
    if value.is_null() {
        return None;
    }
    let rendered = render_scalar(value);
    let cleaned = strip_backticks(&rendered);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Turns one ambiguous value into an ordered list of `T`.
///
/// Accepted shapes, in priority order:
/// - `null` -> `None`
/// - a JSON array of scalars (nulls and blank entries dropped)
/// - a string holding a JSON array, possibly wrapped in up to three layers
///   of extra string encoding
/// - a plain delimiter-separated string, with optional enclosing brackets
///   or parentheses and per-token quotes
///
/// A string that yields no tokens maps to `None`. Cast failures inside any
/// element propagate as the caster's error.
pub fn coerce_list<T: CastFrom>(value: &Value) -> Result<Option<Vec<T>>, ToolError> {
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                if item.is_null() {
                    continue;
                }
                let rendered = render_scalar(item);
                let cleaned = strip_backticks(&rendered);
                if cleaned.is_empty() {
                    continue;
                }
                out.push(T::cast(cleaned)?);
            }
            Ok(Some(out))
        }
        Value::String(s) => coerce_list_from_str(s),
        other => Err(ToolError::invalid_params(format!(
            "expected a list or string, got {}",
            type_name(other)
        ))),
    }
}

fn coerce_list_from_str<T: CastFrom>(raw: &str) -> Result<Option<Vec<T>>, ToolError> {
    let mut s = strip_backticks(raw).to_string();
    if s.is_empty() {
        return Ok(None);
    }

    // Peel nested JSON string encodings; the first layer that parses as an
    // array wins.
    for _ in 0..MAX_JSON_PEELS {
        let parsed: Value = match serde_json::from_str(&s) {
            Ok(value) => value,
            Err(_) => break,
        };
        match parsed {
            Value::Array(items) => {
                let mut out = Vec::new();
                for item in &items {
                    let rendered = render_scalar(item);
                    let token = rendered.trim();
                    if token.is_empty() {
                        continue;
                    }
                    out.push(T::cast(token)?);
                }
                return Ok(Some(out));
            }
            Value::String(inner) => {
                if inner == s {
                    break;
                }
                s = inner;
            }
            _ => break,
        }
    }

    let stripped = strip_enclosing_brackets(&s);
    let mut out = Vec::new();
    for part in TOKEN_SPLIT.split(stripped) {
        let token = part.trim().trim_matches('\'').trim_matches('"');
        if token.is_empty() {
            continue;
        }
        out.push(T::cast(token)?);
    }
    if out.is_empty() {
        Ok(None)
    } else {
        Ok(Some(out))
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn strip_backticks(raw: &str) -> &str {
    raw.trim().trim_matches('`')
}

fn strip_enclosing_brackets(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix('[').or_else(|| s.strip_prefix('(')) {
        s = rest.trim_start();
    }
    if let Some(rest) = s.strip_suffix(']').or_else(|| s.strip_suffix(')')) {
        s = rest.trim_end();
    }
    s
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
