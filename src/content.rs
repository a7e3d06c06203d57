//! Content items and field mappings
//!
//! A [`ContentItem`] is an immutable snapshot handed in by the content store
//! for one generation request. A [`FieldMapping`] ties schema properties to
//! content fields for one content type.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl ImageRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            width: None,
            height: None,
        }
    }
}

/// Snapshot of one content unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u64,
    /// Content type tag, e.g. `post` or `product`
    pub content_type: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Rich text body (HTML)
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub published: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub modified: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub author: Option<Author>,
    /// Taxonomy slug -> assigned terms
    #[serde(default)]
    pub terms: BTreeMap<String, Vec<Term>>,
    #[serde(default)]
    pub featured_image: Option<ImageRef>,
    /// Dedicated meta fields stored alongside the content
    #[serde(default)]
    pub meta: BTreeMap<String, Value>,
}

impl ContentItem {
    pub fn new(id: u64, content_type: impl Into<String>) -> Self {
        Self {
            id,
            content_type: content_type.into(),
            url: String::new(),
            title: String::new(),
            excerpt: None,
            body: String::new(),
            published: None,
            modified: None,
            author: None,
            terms: BTreeMap::new(),
            featured_image: None,
            meta: BTreeMap::new(),
        }
    }

    pub fn terms(&self, taxonomy: &str) -> &[Term] {
        self.terms.get(taxonomy).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn primary_term(&self, taxonomy: &str) -> Option<&Term> {
        self.terms(taxonomy).first()
    }

    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Declared type of a `custom:<type>:<value>` literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomKind {
    Text,
    Number,
    Date,
    Url,
    Boolean,
}

impl FromStr for CustomKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(CustomKind::Text),
            "number" => Ok(CustomKind::Number),
            "date" => Ok(CustomKind::Date),
            "url" => Ok(CustomKind::Url),
            "boolean" => Ok(CustomKind::Boolean),
            other => Err(format!("unknown custom value type `{}`", other)),
        }
    }
}

impl fmt::Display for CustomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CustomKind::Text => "text",
            CustomKind::Number => "number",
            CustomKind::Date => "date",
            CustomKind::Url => "url",
            CustomKind::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// Reference from a schema property to where its value comes from.
///
/// Parsed from the tagged string stored in the mapping configuration:
/// - `taxonomy:<slug>`
/// - `custom:<type>:<value>`
/// - anything else is a plain field key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldKey {
    Field(String),
    Taxonomy(String),
    Custom { kind: CustomKind, value: String },
}

impl FieldKey {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldKey::Field(key) => key.trim().is_empty(),
            FieldKey::Taxonomy(slug) => slug.trim().is_empty(),
            FieldKey::Custom { value, .. } => value.trim().is_empty(),
        }
    }
}

impl FromStr for FieldKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(slug) = s.strip_prefix("taxonomy:") {
            return Ok(FieldKey::Taxonomy(slug.to_string()));
        }
        if let Some(rest) = s.strip_prefix("custom:") {
            // The value may itself contain colons (URLs, times)
            let (kind, value) = rest
                .split_once(':')
                .ok_or_else(|| format!("custom field `{}` is missing a value", s))?;
            return Ok(FieldKey::Custom {
                kind: kind.parse()?,
                value: value.to_string(),
            });
        }
        Ok(FieldKey::Field(s.to_string()))
    }
}

impl TryFrom<String> for FieldKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldKey> for String {
    fn from(key: FieldKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Field(key) => f.write_str(key),
            FieldKey::Taxonomy(slug) => write!(f, "taxonomy:{}", slug),
            FieldKey::Custom { kind, value } => write!(f, "custom:{}:{}", kind, value),
        }
    }
}

/// Tag naming the collaborator that resolves a plain field key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SourceTag(String);

impl SourceTag {
    pub const NATIVE: &'static str = "native";

    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into().trim().to_ascii_lowercase())
    }

    pub fn native() -> Self {
        Self(Self::NATIVE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SourceTag {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

impl From<SourceTag> for String {
    fn from(tag: SourceTag) -> Self {
        tag.0
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per content type table: schema property -> field key, plus the source tag
/// each plain field key was registered under.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub fields: BTreeMap<String, FieldKey>,
    pub sources: BTreeMap<String, SourceTag>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `property` to a tagged field key string.
    pub fn map(mut self, property: &str, key: &str) -> Self {
        if let Ok(parsed) = key.parse() {
            self.fields.insert(property.to_string(), parsed);
        }
        self
    }

    /// Maps `property` to a plain field key resolved by `source`.
    pub fn map_from(mut self, property: &str, key: &str, source: &str) -> Self {
        self.fields
            .insert(property.to_string(), FieldKey::Field(key.to_string()));
        self.sources.insert(key.to_string(), SourceTag::new(source));
        self
    }

    pub fn get(&self, property: &str) -> Option<&FieldKey> {
        self.fields.get(property).filter(|k| !k.is_empty())
    }

    pub fn source_of(&self, field_key: &str) -> SourceTag {
        self.sources
            .get(field_key)
            .cloned()
            .unwrap_or_else(SourceTag::native)
    }

    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}
