//! Collaborator contracts
//!
//! The engine depends on these traits only. Every call may fail with a
//! [`CollaboratorError`]; the engine logs the failure and carries on as if the
//! collaborator had nothing to offer. Closures implement the single-method
//! traits directly, so callers can wire ad-hoc behavior without new types.
//!
//! The in-memory implementations here back the FFI entry points (which receive
//! snapshots of collaborator data in the request) and the tests.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::content::{ContentItem, FieldMapping, ImageRef};
use crate::error::CollaboratorError;
use crate::extractors::detect_emitted_types;
use crate::schema::{SchemaDocument, SchemaType};

/// Resolves a plain field key for a content item. One source per source tag.
pub trait FieldSource: Send + Sync {
    fn resolve(&self, item: &ContentItem, field_key: &str)
        -> Result<Option<Value>, CollaboratorError>;
}

impl<F> FieldSource for F
where
    F: Fn(&ContentItem, &str) -> Result<Option<Value>, CollaboratorError> + Send + Sync,
{
    fn resolve(
        &self,
        item: &ContentItem,
        field_key: &str,
    ) -> Result<Option<Value>, CollaboratorError> {
        self(item, field_key)
    }
}

/// Intrinsic content attributes, then the item's own meta fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFieldSource;

impl FieldSource for NativeFieldSource {
    fn resolve(
        &self,
        item: &ContentItem,
        field_key: &str,
    ) -> Result<Option<Value>, CollaboratorError> {
        let text = |s: &str| Some(Value::String(s.to_string()));
        let value = match field_key {
            "post_title" | "title" => text(&item.title),
            "post_excerpt" | "excerpt" => item.excerpt.as_deref().and_then(text),
            "post_content" | "content" => text(&item.body),
            "permalink" | "url" => text(&item.url),
            "post_date" => item.published.map(|d| Value::String(d.to_rfc3339())),
            "post_modified" => item.modified.map(|d| Value::String(d.to_rfc3339())),
            "post_author" | "author" => item.author.as_ref().and_then(|a| text(&a.name)),
            "featured_image" => item.featured_image.as_ref().and_then(|i| text(&i.url)),
            key => item.meta.get(key).cloned(),
        };
        Ok(value)
    }
}

/// Fixed field values keyed by field key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticFieldSource(pub HashMap<String, Value>);

impl FieldSource for StaticFieldSource {
    fn resolve(
        &self,
        _item: &ContentItem,
        field_key: &str,
    ) -> Result<Option<Value>, CollaboratorError> {
        Ok(self.0.get(field_key).cloned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub duration_seconds: u32,
}

pub trait VideoMetadataProvider: Send + Sync {
    fn metadata(
        &self,
        platform: &str,
        video_id: &str,
    ) -> Result<Option<VideoMetadata>, CollaboratorError>;
}

impl<F> VideoMetadataProvider for F
where
    F: Fn(&str, &str) -> Result<Option<VideoMetadata>, CollaboratorError> + Send + Sync,
{
    fn metadata(
        &self,
        platform: &str,
        video_id: &str,
    ) -> Result<Option<VideoMetadata>, CollaboratorError> {
        self(platform, video_id)
    }
}

/// Durations keyed by `platform:video_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticVideoDurations(pub HashMap<String, u32>);

impl VideoMetadataProvider for StaticVideoDurations {
    fn metadata(
        &self,
        platform: &str,
        video_id: &str,
    ) -> Result<Option<VideoMetadata>, CollaboratorError> {
        let key = format!("{}:{}", platform, video_id);
        Ok(self
            .0
            .get(&key)
            .map(|&duration_seconds| VideoMetadata { duration_seconds }))
    }
}

/// Publisher / organization details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationInfo {
    pub name: String,
    pub url: Option<String>,
    pub logo: Option<String>,
}

impl OrganizationInfo {
    pub fn is_usable(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

pub trait OrganizationProvider: Send + Sync {
    fn organization(&self) -> Result<Option<OrganizationInfo>, CollaboratorError>;
}

impl OrganizationProvider for OrganizationInfo {
    fn organization(&self) -> Result<Option<OrganizationInfo>, CollaboratorError> {
        Ok(self.is_usable().then(|| self.clone()))
    }
}

pub trait FallbackImageProvider: Send + Sync {
    fn fallback_image(&self) -> Result<Option<ImageRef>, CollaboratorError>;
}

impl FallbackImageProvider for ImageRef {
    fn fallback_image(&self) -> Result<Option<ImageRef>, CollaboratorError> {
        Ok((!self.url.trim().is_empty()).then(|| self.clone()))
    }
}

/// Post-build adjustment of one document.
pub trait DocumentHook: Send + Sync {
    fn apply(
        &self,
        document: &SchemaDocument,
        item: &ContentItem,
        mapping: &FieldMapping,
        schema_type: SchemaType,
    ) -> Result<SchemaDocument, CollaboratorError>;
}

impl<F> DocumentHook for F
where
    F: Fn(
            &SchemaDocument,
            &ContentItem,
            &FieldMapping,
            SchemaType,
        ) -> Result<SchemaDocument, CollaboratorError>
        + Send
        + Sync,
{
    fn apply(
        &self,
        document: &SchemaDocument,
        item: &ContentItem,
        mapping: &FieldMapping,
        schema_type: SchemaType,
    ) -> Result<SchemaDocument, CollaboratorError> {
        self(document, item, mapping, schema_type)
    }
}

/// Adjustment of the whole document set for one content item.
pub trait DocumentSetHook: Send + Sync {
    fn apply(
        &self,
        documents: &[SchemaDocument],
        item: &ContentItem,
    ) -> Result<Vec<SchemaDocument>, CollaboratorError>;
}

impl<F> DocumentSetHook for F
where
    F: Fn(&[SchemaDocument], &ContentItem) -> Result<Vec<SchemaDocument>, CollaboratorError>
        + Send
        + Sync,
{
    fn apply(
        &self,
        documents: &[SchemaDocument],
        item: &ContentItem,
    ) -> Result<Vec<SchemaDocument>, CollaboratorError> {
        self(documents, item)
    }
}

/// Post-adjustment of the estimated time in minutes.
pub trait TimeRequiredHook: Send + Sync {
    fn adjust(&self, minutes: u32, item: &ContentItem) -> u32;
}

impl<F> TimeRequiredHook for F
where
    F: Fn(u32, &ContentItem) -> u32 + Send + Sync,
{
    fn adjust(&self, minutes: u32, item: &ContentItem) -> u32 {
        self(minutes, item)
    }
}

/// Reports which schema types another emitter already outputs for the item.
pub trait EmittedTypeDetector: Send + Sync {
    fn detect(&self, item: &ContentItem) -> Result<Vec<String>, CollaboratorError>;
}

/// A fixed list of externally emitted types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticEmittedTypes(pub Vec<String>);

impl EmittedTypeDetector for StaticEmittedTypes {
    fn detect(&self, _item: &ContentItem) -> Result<Vec<String>, CollaboratorError> {
        Ok(self.0.clone())
    }
}

/// Detects types by scanning the page markup another emitter produced
/// (JSON-LD scripts and microdata).
pub struct MarkupTypeDetector<F> {
    render: F,
}

impl<F> MarkupTypeDetector<F>
where
    F: Fn(&ContentItem) -> Result<Option<String>, CollaboratorError> + Send + Sync,
{
    pub fn new(render: F) -> Self {
        Self { render }
    }
}

impl<F> EmittedTypeDetector for MarkupTypeDetector<F>
where
    F: Fn(&ContentItem) -> Result<Option<String>, CollaboratorError> + Send + Sync,
{
    fn detect(&self, item: &ContentItem) -> Result<Vec<String>, CollaboratorError> {
        Ok((self.render)(item)?
            .map(|html| detect_emitted_types(&html))
            .unwrap_or_default())
    }
}

/// Providers consulted while building documents. Any of them may be absent.
#[derive(Default)]
pub struct Collaborators {
    pub video: Option<Box<dyn VideoMetadataProvider>>,
    pub organization: Option<Box<dyn OrganizationProvider>>,
    pub fallback_image: Option<Box<dyn FallbackImageProvider>>,
    pub time_required: Option<Box<dyn TimeRequiredHook>>,
}
