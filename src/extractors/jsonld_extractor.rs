//! Schema types already present as JSON-LD
//!
//! Reads every `<script type="application/ld+json">` block of rendered markup,
//! walking top-level arrays and `@graph` containers, and reports the `@type`
//! names found. Used to tell which types another emitter already produces.

use scraper::{Html, Selector};
use serde_json::Value;

/// Type names declared by JSON-LD blocks, in document order, without repeats.
pub fn jsonld_types(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse(r#"script[type="application/ld+json"]"#) {
        Ok(s) => s,
        Err(_) => return vec![],
    };

    let mut types = Vec::new();

    for element in document.select(&selector) {
        let content = element.inner_html();
        let trimmed = content.trim();

        if trimmed.is_empty() {
            continue;
        }

        // Broken blocks are skipped
        if let Ok(json) = serde_json::from_str::<Value>(trimmed) {
            collect_types(&json, &mut types);
        }
    }

    types
}

fn collect_types(value: &Value, types: &mut Vec<String>) {
    match value {
        Value::Array(arr) => {
            for item in arr {
                collect_types(item, types);
            }
        }
        Value::Object(obj) => {
            if let Some(Value::Array(graph_items)) = obj.get("@graph") {
                for item in graph_items {
                    collect_types(item, types);
                }
            }
            let declared = match obj.get("@type") {
                Some(Value::String(s)) => vec![s.as_str()],
                Some(Value::Array(arr)) => arr.iter().filter_map(|v| v.as_str()).collect(),
                _ => vec![],
            };
            for name in declared {
                push_type(types, name);
            }
        }
        _ => {}
    }
}

/// Adds a type name with any schema.org prefix removed.
pub(crate) fn push_type(types: &mut Vec<String>, raw: &str) {
    let name = raw
        .trim()
        .trim_end_matches('/')
        .rsplit(['/', '#', ':'])
        .next()
        .unwrap_or(raw)
        .trim();
    if !name.is_empty() && !types.iter().any(|t| t == name) {
        types.push(name.to_string());
    }
}
