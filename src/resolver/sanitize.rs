//! Sanitization of raw field values
//!
//! Collaborators hand back whatever is stored: HTML fragments, URLs, emails,
//! and occasionally a serialized structure that leaked out of a meta table.
//! Text is stripped to plain form; URLs and emails pass untouched; dumps are
//! dropped.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use url::Url;

use super::ResolvedValue;
use crate::html;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

/// Serialized-PHP payloads: `a:2:{...}`, `O:8:"Foo":...`, `s:5:"hello";`, scalars.
static SERIALIZED_PAYLOAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:a:\d+:\{|O:\d+:"|s:\d+:"|i:-?\d+;|b:[01];|d:-?\d+(?:\.\d+)?;|N;$)"#)
        .unwrap()
});

/// `print_r` / `var_dump` output.
static DEBUG_DUMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:Array\s*\(|[A-Za-z_\\][\w\\]* Object\s*\(|array\(\d+\)\s*\{|object\([\w\\]+\)#\d+)|\[[^\]\n]+\]\s*=>",
    )
    .unwrap()
});

pub fn looks_like_url(s: &str) -> bool {
    !s.contains(char::is_whitespace)
        && Url::parse(s)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
            .unwrap_or(false)
}

pub fn looks_like_email(s: &str) -> bool {
    EMAIL.is_match(s)
}

/// Heuristic: does this string look like a raw dump of structured data rather
/// than human-readable text? False positives and negatives are possible.
pub fn looks_like_raw_dump(s: &str) -> bool {
    let t = s.trim();
    if SERIALIZED_PAYLOAD.is_match(t) || DEBUG_DUMP.is_match(t) {
        return true;
    }
    if t.starts_with('{') || t.starts_with('[') {
        return matches!(
            serde_json::from_str::<Value>(t),
            Ok(Value::Object(_)) | Ok(Value::Array(_))
        );
    }
    false
}

/// Plain text for one string value, or `None` if nothing usable remains.
pub fn sanitize_text(raw: &str) -> Option<String> {
    let t = raw.trim();
    if t.is_empty() {
        return None;
    }
    if looks_like_url(t) || looks_like_email(t) {
        return Some(t.to_string());
    }
    if looks_like_raw_dump(t) {
        tracing::debug!("discarding raw data dump ({} bytes)", t.len());
        return None;
    }
    let text = html::strip_tags(t);
    (!text.is_empty()).then_some(text)
}

fn sanitize_json(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) => sanitize_text(&s).map(Value::String),
        Value::Array(items) => {
            let kept: Vec<Value> = items.into_iter().filter_map(sanitize_json).collect();
            (!kept.is_empty()).then_some(Value::Array(kept))
        }
        Value::Object(map) => sanitize_object(map).map(Value::Object),
        other => Some(other),
    }
}

fn sanitize_object(map: Map<String, Value>) -> Option<Map<String, Value>> {
    let kept: Map<String, Value> = map
        .into_iter()
        .filter_map(|(k, v)| sanitize_json(v).map(|v| (k, v)))
        .collect();
    (!kept.is_empty()).then_some(kept)
}

/// Sanitizes a raw collaborator value into a [`ResolvedValue`].
pub fn sanitize_value(raw: Value) -> Option<ResolvedValue> {
    match raw {
        Value::Null => None,
        Value::Bool(b) => Some(ResolvedValue::Boolean(b)),
        Value::Number(n) => n.as_f64().map(ResolvedValue::Number),
        Value::String(s) => sanitize_text(&s).map(ResolvedValue::Text),
        Value::Array(items) => {
            let kept: Vec<Value> = items.into_iter().filter_map(sanitize_json).collect();
            (!kept.is_empty()).then_some(ResolvedValue::List(kept))
        }
        Value::Object(map) => sanitize_object(map).map(ResolvedValue::Object),
    }
}
