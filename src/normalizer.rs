//! Recovers a JSON value from free-text model output.

use crate::error::MalformedResponse;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// Leftmost `{` or `[`, greedy up to the last matching closer.
static JSON_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\{.*\}|\[.*\]").expect("static regex")
});

/// Greedy bracket span, or `None` when the text has no `{...}` or `[...]`.
pub fn extract_json_span(text: &str) -> Option<&str> {
    JSON_SPAN.find(text).map(|m| m.as_str())
}

/// Parses the first bracketed span of `text`; a top-level `result` key is unwrapped
/// unless it holds null, false, 0 or an empty string.
pub fn normalize(text: &str) -> Result<Value, MalformedResponse> {
    let span = extract_json_span(text).ok_or_else(|| MalformedResponse {
        reason: "no JSON object or array found".into(),
        raw: text.to_string(),
    })?;

    let parsed: Value = serde_json::from_str(span).map_err(|e| MalformedResponse {
        reason: e.to_string(),
        raw: text.to_string(),
    })?;

    Ok(unwrap_result(parsed))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn unwrap_result(value: Value) -> Value {
    match value {
        Value::Object(mut map) => match map.remove("result") {
            Some(inner) if is_truthy(&inner) => inner,
            Some(inner) => {
                map.insert("result".into(), inner);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}
