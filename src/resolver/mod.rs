//! Field resolution
//!
//! Turns a mapped schema property into a concrete value for one content item.
//! Taxonomy and literal (`custom:`) keys are resolved here; plain keys are
//! dispatched to the [`FieldSource`] registered for the key's source tag.

mod sanitize;

pub use sanitize::{
    looks_like_email, looks_like_raw_dump, looks_like_url, sanitize_text, sanitize_value,
};

use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use tracing::{debug, warn};
use url::Url;

use crate::content::{ContentItem, CustomKind, FieldKey, FieldMapping, SourceTag};
use crate::normalize::is_iso_date;
use crate::providers::{FieldSource, NativeFieldSource};

/// Sanitized value of one resolved property.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    List(Vec<Value>),
    /// Linked entity or structured sub-object, e.g. `{name, url}`
    Object(Map<String, Value>),
}

impl ResolvedValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResolvedValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ResolvedValue::Number(n) => Some(*n),
            ResolvedValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Text form of scalars; lists are joined with `, `.
    pub fn to_text(&self) -> Option<String> {
        match self {
            ResolvedValue::Text(s) => Some(s.clone()),
            ResolvedValue::Number(_) | ResolvedValue::Boolean(_) => {
                Some(self.to_value().to_string())
            }
            ResolvedValue::List(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect();
                (!parts.is_empty()).then(|| parts.join(", "))
            }
            ResolvedValue::Object(map) => {
                map.get("name").and_then(|v| v.as_str()).map(String::from)
            }
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ResolvedValue::Text(s) => Value::String(s.clone()),
            ResolvedValue::Number(n) => number_value(*n),
            ResolvedValue::Boolean(b) => Value::Bool(*b),
            ResolvedValue::List(items) => Value::Array(items.clone()),
            ResolvedValue::Object(map) => Value::Object(map.clone()),
        }
    }
}

/// Whole numbers serialize without a fraction.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Field sources keyed by source tag. Fixed once the engine is built.
pub struct SourceRegistry {
    sources: HashMap<SourceTag, Box<dyn FieldSource>>,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceRegistry {
    /// Registry with the native source preinstalled.
    pub fn new() -> Self {
        let mut sources: HashMap<SourceTag, Box<dyn FieldSource>> = HashMap::new();
        sources.insert(SourceTag::native(), Box::new(NativeFieldSource));
        Self { sources }
    }

    pub fn register(&mut self, tag: SourceTag, source: impl FieldSource + 'static) {
        self.sources.insert(tag, Box::new(source));
    }

    pub fn get(&self, tag: &SourceTag) -> Option<&dyn FieldSource> {
        self.sources.get(tag).map(|s| s.as_ref())
    }

    pub fn tags(&self) -> impl Iterator<Item = &SourceTag> {
        self.sources.keys()
    }
}

pub struct FieldResolver {
    registry: SourceRegistry,
}

impl Default for FieldResolver {
    fn default() -> Self {
        Self::new(SourceRegistry::new())
    }
}

impl FieldResolver {
    pub fn new(registry: SourceRegistry) -> Self {
        Self { registry }
    }

    /// Resolves `property` through `mapping`. `None` means the caller should
    /// fall back to auto-detection or omit the property.
    pub fn resolve(
        &self,
        item: &ContentItem,
        property: &str,
        mapping: &FieldMapping,
    ) -> Option<ResolvedValue> {
        match mapping.get(property)? {
            FieldKey::Taxonomy(slug) => resolve_taxonomy(item, slug),
            FieldKey::Custom { kind, value } => parse_custom(*kind, value),
            FieldKey::Field(key) => {
                let raw = self.fetch(item, key, &mapping.source_of(key))?;
                sanitize_value(raw)
            }
        }
    }

    /// Unsanitized value for structured inputs (e.g. chapter arrays).
    pub fn resolve_raw(
        &self,
        item: &ContentItem,
        property: &str,
        mapping: &FieldMapping,
    ) -> Option<Value> {
        match mapping.get(property)? {
            FieldKey::Field(key) => self.fetch(item, key, &mapping.source_of(key)),
            _ => self.resolve(item, property, mapping).map(|v| v.to_value()),
        }
    }

    fn fetch(&self, item: &ContentItem, key: &str, tag: &SourceTag) -> Option<Value> {
        let Some(source) = self.registry.get(tag) else {
            debug!("no field source registered for tag `{}` (field `{}`)", tag, key);
            return None;
        };
        match source.resolve(item, key) {
            Ok(value) => value.filter(|v| !v.is_null()),
            Err(e) => {
                warn!("field source `{}` failed for item {}: {}", tag, item.id, e);
                None
            }
        }
    }
}

fn resolve_taxonomy(item: &ContentItem, slug: &str) -> Option<ResolvedValue> {
    let names: Vec<&str> = item
        .terms(slug)
        .iter()
        .map(|t| t.name.trim())
        .filter(|n| !n.is_empty())
        .collect();
    (!names.is_empty()).then(|| ResolvedValue::Text(names.join(", ")))
}

fn parse_custom(kind: CustomKind, raw: &str) -> Option<ResolvedValue> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    match kind {
        CustomKind::Text => Some(ResolvedValue::Text(value.to_string())),
        CustomKind::Number => value
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(ResolvedValue::Number),
        CustomKind::Date => is_iso_date(value).then(|| ResolvedValue::Text(value.to_string())),
        CustomKind::Url => Url::parse(value)
            .ok()
            .filter(|u| u.host_str().is_some())
            .map(|_| ResolvedValue::Text(value.to_string())),
        CustomKind::Boolean => match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(ResolvedValue::Boolean(true)),
            "false" | "0" | "no" => Some(ResolvedValue::Boolean(false)),
            _ => None,
        },
    }
}
