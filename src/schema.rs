//! Schema documents and the supported schema.org types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub const SCHEMA_CONTEXT: &str = "https://schema.org";

/// The schema.org types this crate knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SchemaType {
    Article,
    BlogPosting,
    NewsArticle,
    Product,
    Recipe,
    HowTo,
    #[serde(rename = "FAQPage")]
    FaqPage,
    Event,
    Course,
    LearningResource,
    VideoObject,
    Review,
    LocalBusiness,
    Organization,
    Person,
    JobPosting,
}

impl SchemaType {
    pub const ALL: [SchemaType; 16] = [
        SchemaType::Article,
        SchemaType::BlogPosting,
        SchemaType::NewsArticle,
        SchemaType::Product,
        SchemaType::Recipe,
        SchemaType::HowTo,
        SchemaType::FaqPage,
        SchemaType::Event,
        SchemaType::Course,
        SchemaType::LearningResource,
        SchemaType::VideoObject,
        SchemaType::Review,
        SchemaType::LocalBusiness,
        SchemaType::Organization,
        SchemaType::Person,
        SchemaType::JobPosting,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaType::Article => "Article",
            SchemaType::BlogPosting => "BlogPosting",
            SchemaType::NewsArticle => "NewsArticle",
            SchemaType::Product => "Product",
            SchemaType::Recipe => "Recipe",
            SchemaType::HowTo => "HowTo",
            SchemaType::FaqPage => "FAQPage",
            SchemaType::Event => "Event",
            SchemaType::Course => "Course",
            SchemaType::LearningResource => "LearningResource",
            SchemaType::VideoObject => "VideoObject",
            SchemaType::Review => "Review",
            SchemaType::LocalBusiness => "LocalBusiness",
            SchemaType::Organization => "Organization",
            SchemaType::Person => "Person",
            SchemaType::JobPosting => "JobPosting",
        }
    }

    /// Article-like types use `headline` instead of `name`.
    pub fn is_article(self) -> bool {
        matches!(
            self,
            SchemaType::Article | SchemaType::BlogPosting | SchemaType::NewsArticle
        )
    }

    /// Types that carry publication dates taken from the content item.
    pub fn is_creative_work(self) -> bool {
        !matches!(
            self,
            SchemaType::Product
                | SchemaType::Event
                | SchemaType::LocalBusiness
                | SchemaType::Organization
                | SchemaType::Person
                | SchemaType::JobPosting
        )
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s
            .trim()
            .strip_prefix("https://schema.org/")
            .or_else(|| s.trim().strip_prefix("http://schema.org/"))
            .unwrap_or(s.trim());
        SchemaType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("unsupported schema type `{}`", s))
    }
}

/// One JSON-LD object. `@type` is always the first key; `@context` is only
/// added when documents are wrapped for output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDocument(Map<String, Value>);

impl SchemaDocument {
    pub fn new(schema_type: SchemaType) -> Self {
        Self::with_type_name(schema_type.as_str())
    }

    pub fn with_type_name(name: &str) -> Self {
        let mut map = Map::new();
        map.insert("@type".to_string(), Value::String(name.to_string()));
        Self(map)
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// First declared `@type` (JSON-LD allows an array of types).
    pub fn schema_type(&self) -> Option<&str> {
        self.types().into_iter().next()
    }

    pub fn types(&self) -> Vec<&str> {
        match self.0.get("@type") {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(arr)) => arr.iter().filter_map(|v| v.as_str()).collect(),
            _ => vec![],
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Sets the property when a value is available and it is not set yet.
    pub fn set_missing(&mut self, key: &str, value: Option<Value>) {
        if self.contains(key) {
            return;
        }
        if let Some(value) = value {
            self.0.insert(key.to_string(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Removes null, blank-string, empty-array and empty-object leaves at every
    /// depth. Nested objects left with nothing but `@type` are removed too.
    pub fn strip_empty(&mut self) {
        let map = std::mem::take(&mut self.0);
        self.0 = map
            .into_iter()
            .filter_map(|(k, v)| prune(v).map(|v| (k, v)))
            .collect();
    }
}

fn prune(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(Value::String(s))
            }
        }
        Value::Array(items) => {
            let kept: Vec<Value> = items.into_iter().filter_map(prune).collect();
            if kept.is_empty() {
                None
            } else {
                Some(Value::Array(kept))
            }
        }
        Value::Object(map) => {
            let kept: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| prune(v).map(|v| (k, v)))
                .collect();
            let only_type = kept.len() == 1 && kept.contains_key("@type");
            if kept.is_empty() || only_type {
                None
            } else {
                Some(Value::Object(kept))
            }
        }
        other => Some(other),
    }
}

/// True when no leaf anywhere in `value` is null, blank or an empty container.
pub fn has_no_empty_leaves(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty() && items.iter().all(has_no_empty_leaves),
        Value::Object(map) => !map.is_empty() && map.values().all(has_no_empty_leaves),
        _ => true,
    }
}

/// Wrap documents for output: `@context` once at the outermost level, several
/// documents go into `@graph`.
pub fn to_json_ld(documents: &[SchemaDocument]) -> Option<Value> {
    let strip_context = |doc: &SchemaDocument| {
        let mut map = doc.properties().clone();
        map.shift_remove("@context");
        map
    };

    match documents {
        [] => None,
        [single] => {
            let mut map = Map::new();
            map.insert(
                "@context".to_string(),
                Value::String(SCHEMA_CONTEXT.to_string()),
            );
            map.extend(strip_context(single));
            Some(Value::Object(map))
        }
        many => {
            let graph = many
                .iter()
                .map(|doc| Value::Object(strip_context(doc)))
                .collect();
            let mut map = Map::new();
            map.insert(
                "@context".to_string(),
                Value::String(SCHEMA_CONTEXT.to_string()),
            );
            map.insert("@graph".to_string(), Value::Array(graph));
            Some(Value::Object(map))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_type_round_trip_names() {
        for t in SchemaType::ALL {
            assert_eq!(t.as_str().parse::<SchemaType>().unwrap(), t);
        }
        assert_eq!(
            "https://schema.org/FAQPage".parse::<SchemaType>().unwrap(),
            SchemaType::FaqPage
        );
        assert!("Thing".parse::<SchemaType>().is_err());
    }

    #[test]
    fn test_schema_type_serde_name() {
        let v = serde_json::to_value(SchemaType::FaqPage).unwrap();
        assert_eq!(v, json!("FAQPage"));
    }

    #[test]
    fn test_strip_empty_nested() {
        let mut doc = SchemaDocument::new(SchemaType::Product);
        doc.set("name", "Widget");
        doc.set("description", "  ");
        doc.set("sku", Value::Null);
        doc.set("image", json!([]));
        doc.set("offers", json!({"@type": "Offer", "price": null, "priceCurrency": ""}));
        doc.set("brand", json!({"@type": "Brand", "name": "Acme", "logo": {}}));
        doc.set("sameAs", json!(["", "https://example.com"]));
        doc.strip_empty();

        assert_eq!(
            doc.into_value(),
            json!({
                "@type": "Product",
                "name": "Widget",
                "brand": {"@type": "Brand", "name": "Acme"},
                "sameAs": ["https://example.com"]
            })
        );
    }

    #[test]
    fn test_strip_keeps_zero_and_false() {
        let mut doc = SchemaDocument::new(SchemaType::JobPosting);
        doc.set("directApply", false);
        doc.set("position", 0);
        doc.strip_empty();
        assert_eq!(doc.get("directApply"), Some(&json!(false)));
        assert_eq!(doc.get("position"), Some(&json!(0)));
    }

    #[test]
    fn test_json_ld_single_document() {
        let mut doc = SchemaDocument::new(SchemaType::Article);
        doc.set("headline", "Hello");
        let out = to_json_ld(&[doc]).unwrap();
        assert_eq!(out["@context"], json!(SCHEMA_CONTEXT));
        assert_eq!(out["@type"], json!("Article"));
        let first_key = out.as_object().unwrap().keys().next().unwrap().clone();
        assert_eq!(first_key, "@context");
    }

    #[test]
    fn test_json_ld_graph_strips_inner_context() {
        let mut a = SchemaDocument::new(SchemaType::Article);
        a.set("@context", SCHEMA_CONTEXT);
        let b = SchemaDocument::new(SchemaType::FaqPage);
        let out = to_json_ld(&[a, b]).unwrap();
        let graph = out["@graph"].as_array().unwrap();
        assert_eq!(graph.len(), 2);
        assert!(graph.iter().all(|d| d.get("@context").is_none()));
        assert!(to_json_ld(&[]).is_none());
    }

    #[test]
    fn test_types_array() {
        let mut map = Map::new();
        map.insert("@type".into(), json!(["Product", "Thing"]));
        let doc = SchemaDocument::from_map(map);
        assert_eq!(doc.schema_type(), Some("Product"));
        assert_eq!(doc.types(), vec!["Product", "Thing"]);
    }
}
