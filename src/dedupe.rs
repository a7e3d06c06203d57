//! Duplicate filtering against another schema emitter
//!
//! Only types that commonly collide with general-purpose SEO plugins are
//! checked. Everything else passes through, even when the other emitter
//! reports the same type.

use std::collections::HashSet;
use tracing::debug;

use crate::schema::SchemaDocument;

/// Types checked against the external emitter.
pub const DUPLICATE_CHECKED_TYPES: &[&str] = &[
    "Article",
    "BlogPosting",
    "NewsArticle",
    "WebPage",
    "WebSite",
    "Organization",
    "Person",
    "BreadcrumbList",
    "Product",
    "FAQPage",
    "HowTo",
    "Recipe",
    "LocalBusiness",
    "VideoObject",
];

/// `https://schema.org/Article` and `schema:Article` both mean `Article`.
fn short_type(raw: &str) -> &str {
    raw.trim().rsplit(['/', '#', ':']).next().unwrap_or_default()
}

/// Drops documents whose `@type` is duplicate-checked and already emitted
/// externally.
pub fn filter(documents: Vec<SchemaDocument>, external_types: &[String]) -> Vec<SchemaDocument> {
    let external: HashSet<&str> = external_types
        .iter()
        .map(|t| short_type(t))
        .filter(|t| !t.is_empty())
        .collect();
    if external.is_empty() {
        return documents;
    }

    documents
        .into_iter()
        .filter(|doc| {
            let Some(schema_type) = doc.schema_type() else {
                return true;
            };
            let duplicate =
                DUPLICATE_CHECKED_TYPES.contains(&schema_type) && external.contains(schema_type);
            if duplicate {
                debug!("skipping {} already emitted by another plugin", schema_type);
            }
            !duplicate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaType;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn docs(types: &[SchemaType]) -> Vec<SchemaDocument> {
        types.iter().map(|t| SchemaDocument::new(*t)).collect()
    }

    fn types_of(documents: &[SchemaDocument]) -> Vec<String> {
        documents
            .iter()
            .filter_map(|d| d.schema_type().map(String::from))
            .collect()
    }

    #[test]
    fn test_article_dropped_review_kept() {
        let kept = filter(
            docs(&[SchemaType::Article, SchemaType::Review]),
            &["Article".to_string()],
        );
        assert_eq!(types_of(&kept), vec!["Review"]);
    }

    #[test]
    fn test_unchecked_type_passes_even_if_external() {
        let kept = filter(
            docs(&[SchemaType::Event, SchemaType::Product]),
            &["Event".to_string(), "Recipe".to_string()],
        );
        assert_eq!(types_of(&kept), vec!["Event", "Product"]);
    }

    #[test]
    fn test_prefixed_external_types() {
        let kept = filter(
            docs(&[SchemaType::FaqPage, SchemaType::HowTo]),
            &["https://schema.org/FAQPage".to_string()],
        );
        assert_eq!(types_of(&kept), vec!["HowTo"]);
    }

    fn schema_type() -> impl Strategy<Value = SchemaType> {
        prop::sample::select(SchemaType::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_only_externally_emitted_checked_types_are_removed(
            ours in prop::collection::vec(schema_type(), 0..8),
            theirs in prop::collection::vec(schema_type(), 0..8),
        ) {
            let external: Vec<String> = theirs.iter().map(|t| t.as_str().to_string()).collect();
            let kept = types_of(&filter(docs(&ours), &external));
            let expected: Vec<String> = ours
                .iter()
                .map(|t| t.as_str())
                .filter(|t| {
                    !(DUPLICATE_CHECKED_TYPES.contains(t) && external.iter().any(|e| e == t))
                })
                .map(String::from)
                .collect();
            prop_assert_eq!(kept, expected);
        }
    }
}
