//! Generation engine
//!
//! Runs the full flow for one content item:
//! types -> build -> per-document hooks -> duplicate filter -> set hooks ->
//! validation. The engine holds no mutable state, so one instance can serve
//! any number of threads.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::builders::{self, BuildContext};
use crate::config::EngineConfig;
use crate::content::{ContentItem, FieldMapping, SourceTag};
use crate::dedupe;
use crate::extractors::{detect_video, extract_faq};
use crate::providers::{
    Collaborators, DocumentHook, DocumentSetHook, EmittedTypeDetector, FallbackImageProvider,
    FieldSource, OrganizationProvider, TimeRequiredHook, VideoMetadataProvider,
};
use crate::resolver::{FieldResolver, SourceRegistry};
use crate::schema::{to_json_ld, SchemaDocument, SchemaType};
use crate::validator::{validate, ValidationReport};

/// Documents for one content item, with a report per document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Generation {
    pub documents: Vec<SchemaDocument>,
    /// Same order as `documents`
    pub reports: Vec<ValidationReport>,
    /// Reports of documents dropped because `emit_invalid` is off
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<ValidationReport>,
}

impl Generation {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// JSON-LD ready for output, or `None` when nothing was generated.
    pub fn to_json_ld(&self) -> Option<Value> {
        to_json_ld(&self.documents)
    }
}

pub struct SchemaEngine {
    config: EngineConfig,
    resolver: FieldResolver,
    collaborators: Collaborators,
    document_hooks: Vec<Box<dyn DocumentHook>>,
    set_hooks: Vec<Box<dyn DocumentSetHook>>,
    type_detector: Option<Box<dyn EmittedTypeDetector>>,
}

impl SchemaEngine {
    pub fn builder(config: EngineConfig) -> SchemaEngineBuilder {
        SchemaEngineBuilder::new(config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Configured types for the item plus the content-detected ones, in
    /// order, without repeats or disabled types.
    pub fn types_for(&self, item: &ContentItem) -> Vec<SchemaType> {
        let mut types = self.config.types_for(&item.content_type);
        let auto = self.config.auto_detect;
        let mut detected = Vec::new();
        if auto.faq && !extract_faq(&item.body).is_empty() {
            detected.push(SchemaType::FaqPage);
        }
        if auto.video && detect_video(&item.body).is_some() {
            detected.push(SchemaType::VideoObject);
        }
        for schema_type in detected {
            if self.config.is_enabled(schema_type) && !types.contains(&schema_type) {
                types.push(schema_type);
            }
        }
        types
    }

    /// One document after the per-document hooks, with empty leaves removed.
    pub fn build_document(
        &self,
        schema_type: SchemaType,
        item: &ContentItem,
        mapping: &FieldMapping,
    ) -> SchemaDocument {
        let ctx = BuildContext::new(
            item,
            mapping,
            &self.resolver,
            &self.config,
            &self.collaborators,
        );
        let mut document = builders::build(schema_type, &ctx);
        for hook in &self.document_hooks {
            match hook.apply(&document, item, mapping, schema_type) {
                Ok(adjusted) => document = adjusted,
                Err(e) => warn!(
                    "document hook skipped for {} on item {}: {}",
                    schema_type, item.id, e
                ),
            }
        }
        document.strip_empty();
        document
    }

    pub fn generate(&self, item: &ContentItem, mapping: &FieldMapping) -> Generation {
        let types = self.types_for(item);
        debug!(
            "item {} ({}): building {:?}",
            item.id, item.content_type, types
        );

        let mut documents: Vec<SchemaDocument> = types
            .into_iter()
            .map(|schema_type| self.build_document(schema_type, item, mapping))
            .collect();

        if self.config.avoid_duplicates {
            let external = self.external_types(item);
            documents = dedupe::filter(documents, &external);
        }

        for hook in &self.set_hooks {
            match hook.apply(&documents, item) {
                Ok(adjusted) => documents = adjusted,
                Err(e) => warn!("document set hook skipped for item {}: {}", item.id, e),
            }
        }

        let mut generation = Generation::default();
        for mut document in documents {
            document.strip_empty();
            let report = validate(&document);
            if !report.valid {
                debug!(
                    "item {}: {} has {} validation error(s)",
                    item.id,
                    report.schema_type.as_deref().unwrap_or("untyped document"),
                    report.errors.len()
                );
                if !self.config.emit_invalid {
                    generation.rejected.push(report);
                    continue;
                }
            }
            generation.documents.push(document);
            generation.reports.push(report);
        }
        generation
    }

    fn external_types(&self, item: &ContentItem) -> Vec<String> {
        let Some(detector) = &self.type_detector else {
            return vec![];
        };
        detector.detect(item).unwrap_or_else(|e| {
            warn!("emitted type detection failed for item {}: {}", item.id, e);
            vec![]
        })
    }
}

/// Wires collaborators into a [`SchemaEngine`]. Hooks run in the order they
/// are added.
pub struct SchemaEngineBuilder {
    config: EngineConfig,
    registry: SourceRegistry,
    collaborators: Collaborators,
    document_hooks: Vec<Box<dyn DocumentHook>>,
    set_hooks: Vec<Box<dyn DocumentSetHook>>,
    type_detector: Option<Box<dyn EmittedTypeDetector>>,
}

impl SchemaEngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: SourceRegistry::new(),
            collaborators: Collaborators::default(),
            document_hooks: Vec::new(),
            set_hooks: Vec::new(),
            type_detector: None,
        }
    }

    /// Registers the resolver for plain field keys tagged `tag`. Registering
    /// `native` replaces the built-in source.
    pub fn field_source(mut self, tag: &str, source: impl FieldSource + 'static) -> Self {
        self.registry.register(SourceTag::new(tag), source);
        self
    }

    pub fn video_metadata(mut self, provider: impl VideoMetadataProvider + 'static) -> Self {
        self.collaborators.video = Some(Box::new(provider));
        self
    }

    pub fn organization(mut self, provider: impl OrganizationProvider + 'static) -> Self {
        self.collaborators.organization = Some(Box::new(provider));
        self
    }

    pub fn fallback_image(mut self, provider: impl FallbackImageProvider + 'static) -> Self {
        self.collaborators.fallback_image = Some(Box::new(provider));
        self
    }

    pub fn time_required(mut self, hook: impl TimeRequiredHook + 'static) -> Self {
        self.collaborators.time_required = Some(Box::new(hook));
        self
    }

    pub fn document_hook(mut self, hook: impl DocumentHook + 'static) -> Self {
        self.document_hooks.push(Box::new(hook));
        self
    }

    pub fn document_set_hook(mut self, hook: impl DocumentSetHook + 'static) -> Self {
        self.set_hooks.push(Box::new(hook));
        self
    }

    pub fn emitted_type_detector(mut self, detector: impl EmittedTypeDetector + 'static) -> Self {
        self.type_detector = Some(Box::new(detector));
        self
    }

    pub fn build(self) -> SchemaEngine {
        SchemaEngine {
            config: self.config,
            resolver: FieldResolver::new(self.registry),
            collaborators: self.collaborators,
            document_hooks: self.document_hooks,
            set_hooks: self.set_hooks,
            type_detector: self.type_detector,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollaboratorError;
    use crate::providers::{OrganizationInfo, StaticEmittedTypes, StaticVideoDurations};
    use crate::schema::has_no_empty_leaves;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::HashMap;

    const FAQ_AND_VIDEO: &str = r#"<p>Intro text for the post.</p>
        <iframe src="https://www.youtube.com/embed/dQw4w9WgXcQ"></iframe>
        <h3>Is it free?</h3><p>Yes, always.</p>"#;

    fn config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config
            .content_types
            .insert("post".into(), SchemaType::BlogPosting);
        config.organization = Some(OrganizationInfo {
            name: "Acme".into(),
            url: Some("https://acme.test".into()),
            logo: None,
        });
        config
    }

    fn post(body: &str) -> ContentItem {
        let mut item = ContentItem::new(11, "post");
        item.url = "https://example.test/post/".into();
        item.title = "A post".into();
        item.body = body.into();
        item.published = "2024-03-01T10:00:00Z".parse().ok();
        item
    }

    fn types_of(generation: &Generation) -> Vec<&str> {
        generation
            .documents
            .iter()
            .filter_map(|d| d.schema_type())
            .collect()
    }

    #[test]
    fn test_types_include_auto_detected() {
        let engine = SchemaEngine::builder(config()).build();
        assert_eq!(
            engine.types_for(&post(FAQ_AND_VIDEO)),
            vec![SchemaType::BlogPosting, SchemaType::FaqPage, SchemaType::VideoObject]
        );

        let mut disabled = config();
        disabled.disabled_types = vec![SchemaType::VideoObject];
        disabled.auto_detect.faq = false;
        let engine = SchemaEngine::builder(disabled).build();
        assert_eq!(engine.types_for(&post(FAQ_AND_VIDEO)), vec![SchemaType::BlogPosting]);
    }

    #[test]
    fn test_generate_end_to_end() {
        let mut durations = HashMap::new();
        durations.insert("youtube:dQw4w9WgXcQ".to_string(), 125);
        let engine = SchemaEngine::builder(config())
            .video_metadata(StaticVideoDurations(durations))
            .build();
        let generation = engine.generate(&post(FAQ_AND_VIDEO), &FieldMapping::new());

        assert_eq!(types_of(&generation), vec!["BlogPosting", "FAQPage", "VideoObject"]);
        assert_eq!(generation.reports.len(), 3);
        assert!(generation.reports[0].valid);
        assert_eq!(generation.documents[2].get_str("duration"), Some("PT2M5S"));

        let json_ld = generation.to_json_ld().unwrap();
        assert_eq!(json_ld["@context"], json!("https://schema.org"));
        assert_eq!(json_ld["@graph"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_generate_is_idempotent() {
        let engine = SchemaEngine::builder(config()).build();
        let item = post(FAQ_AND_VIDEO);
        let mapping = FieldMapping::new().map("keywords", "custom:text:a, b");
        let first = serde_json::to_string(&engine.generate(&item, &mapping)).unwrap();
        let second = serde_json::to_string(&engine.generate(&item, &mapping)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicates_filtered_against_detector() {
        let engine = SchemaEngine::builder(config())
            .emitted_type_detector(StaticEmittedTypes(vec!["BlogPosting".into(), "Review".into()]))
            .build();
        let generation = engine.generate(&post(FAQ_AND_VIDEO), &FieldMapping::new());
        assert_eq!(types_of(&generation), vec!["FAQPage", "VideoObject"]);

        let mut keep_all = config();
        keep_all.avoid_duplicates = false;
        let engine = SchemaEngine::builder(keep_all)
            .emitted_type_detector(StaticEmittedTypes(vec!["BlogPosting".into()]))
            .build();
        let generation = engine.generate(&post(FAQ_AND_VIDEO), &FieldMapping::new());
        assert_eq!(types_of(&generation)[0], "BlogPosting");
    }

    #[test]
    fn test_hooks_run_in_order_and_failures_are_skipped() {
        let engine = SchemaEngine::builder(config())
            .document_hook(
                |doc: &SchemaDocument,
                 _: &ContentItem,
                 _: &FieldMapping,
                 schema_type: SchemaType|
                 -> Result<SchemaDocument, CollaboratorError> {
                    let mut doc = doc.clone();
                    doc.set("genre", format!("{} genre", schema_type));
                    doc.set("copyrightHolder", "");
                    Ok(doc)
                },
            )
            .document_hook(
                |_: &SchemaDocument,
                 _: &ContentItem,
                 _: &FieldMapping,
                 _: SchemaType|
                 -> Result<SchemaDocument, CollaboratorError> {
                    Err(CollaboratorError::new("theme filter", "bad return value"))
                },
            )
            .document_set_hook(
                |docs: &[SchemaDocument],
                 _: &ContentItem|
                 -> Result<Vec<SchemaDocument>, CollaboratorError> {
                    Ok(docs.iter().take(1).cloned().collect())
                },
            )
            .build();

        let generation = engine.generate(&post(FAQ_AND_VIDEO), &FieldMapping::new());
        assert_eq!(types_of(&generation), vec!["BlogPosting"]);
        let doc = &generation.documents[0];
        assert_eq!(doc.get_str("genre"), Some("BlogPosting genre"));
        assert!(!doc.contains("copyrightHolder"));
    }

    #[test]
    fn test_invalid_documents_dropped_only_when_configured() {
        let mut config = config();
        config.content_types.insert("event".into(), SchemaType::Event);
        let mut item = post("<p>No date or place.</p>");
        item.content_type = "event".into();

        let engine = SchemaEngine::builder(config.clone()).build();
        let generation = engine.generate(&item, &FieldMapping::new());
        assert_eq!(types_of(&generation), vec!["Event"]);
        assert!(!generation.reports[0].valid);

        config.emit_invalid = false;
        let engine = SchemaEngine::builder(config).build();
        let generation = engine.generate(&item, &FieldMapping::new());
        assert!(generation.is_empty());
        assert_eq!(generation.rejected.len(), 1);
        assert_eq!(generation.to_json_ld(), None);
    }

    #[test]
    fn test_custom_field_source() {
        let engine = SchemaEngine::builder(config())
            .field_source(
                "acf",
                |item: &ContentItem, key: &str| -> Result<Option<Value>, CollaboratorError> {
                    Ok(Some(json!(format!("<b>{}</b> for {}", key, item.id))))
                },
            )
            .build();
        let mapping = FieldMapping::new().map_from("genre", "post_genre", "acf");
        let generation = engine.generate(&post("<p>x</p>"), &mapping);
        assert_eq!(
            generation.documents[0].get_str("genre"),
            Some("post_genre for 11")
        );
    }

    fn body_fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("<p>Plain words here.</p>".to_string()),
            Just("<h2>Step 1</h2><p>Do X</p>".to_string()),
            Just("<h3>Why?</h3><p></p>".to_string()),
            Just("<ol><li></li><li>Second</li></ol>".to_string()),
            Just(r#"<img src="">"#.to_string()),
            Just("<p>0:00 Intro<br>1:30 - Next</p>".to_string()),
            Just(r#"<iframe src="https://vimeo.com/12345"></iframe>"#.to_string()),
            "[a-z ]{0,20}",
        ]
    }

    proptest! {
        #[test]
        fn prop_generated_documents_have_no_empty_leaves(
            fragments in prop::collection::vec(body_fragment(), 0..6),
            primary in prop::sample::select(SchemaType::ALL.to_vec()),
            title in "[a-zA-Z ]{0,12}",
        ) {
            let mut config = config();
            config.content_types.insert("post".into(), primary);
            let engine = SchemaEngine::builder(config).build();
            let mut item = post(&fragments.concat());
            item.title = title;
            let generation = engine.generate(&item, &FieldMapping::new());
            for document in &generation.documents {
                prop_assert!(has_no_empty_leaves(&document.to_value()), "{:?}", document);
            }
        }
    }
}
