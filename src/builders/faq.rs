//! FAQPage

use serde_json::{json, Value};

use super::{BuildContext, SchemaBuilder};
use crate::extractors::{extract_faq, FaqPair};
use crate::schema::SchemaDocument;

pub struct FaqBuilder;

impl SchemaBuilder for FaqBuilder {
    fn handled_properties(&self) -> &'static [&'static str] {
        &["mainEntity"]
    }

    fn enrich(&self, ctx: &BuildContext<'_>, document: &mut SchemaDocument) {
        let mut pairs = ctx
            .value("mainEntity")
            .map(|v| mapped_pairs(&v))
            .unwrap_or_default();
        if pairs.is_empty() {
            pairs = extract_faq(&ctx.item.body);
        }

        let questions: Vec<Value> = pairs
            .into_iter()
            .map(|pair| {
                json!({
                    "@type": "Question",
                    "name": pair.question,
                    "acceptedAnswer": {"@type": "Answer", "text": pair.answer},
                })
            })
            .collect();
        document.set("mainEntity", questions);
    }
}

/// `[{question, answer}]` objects from a mapped field.
fn mapped_pairs(value: &Value) -> Vec<FaqPair> {
    let Some(items) = value.as_array() else {
        return vec![];
    };
    items
        .iter()
        .filter_map(|entry| {
            let field = |keys: &[&str]| {
                keys.iter()
                    .find_map(|k| entry.get(*k).and_then(|v| v.as_str()))
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
            };
            Some(FaqPair {
                question: field(&["question", "name", "q"])?,
                answer: field(&["answer", "text", "a"])?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::builders::fixture::{item, Fixture};
    use crate::content::FieldMapping;
    use crate::schema::SchemaType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_pairs_from_body() {
        let body = "<h3>Is it free?</h3><p>Yes.</p><p>Always.</p><h3>Ingredients</h3><ul><li>x</li></ul>";
        let doc = Fixture::new(item(body)).build(SchemaType::FaqPage);
        assert_eq!(doc.get_str("@type"), Some("FAQPage"));
        assert_eq!(
            doc.get("mainEntity"),
            Some(&json!([{
                "@type": "Question",
                "name": "Is it free?",
                "acceptedAnswer": {"@type": "Answer", "text": "Yes. Always."}
            }]))
        );
    }

    #[test]
    fn test_mapped_pairs_take_precedence() {
        let mut fx = Fixture::new(item("<h3>Body Q</h3><p>Body A</p>"))
            .with_mapping(FieldMapping::new().map("mainEntity", "faq_items"));
        fx.item.meta.insert(
            "faq_items".into(),
            json!([
                {"question": "Mapped?", "answer": "<b>Yes</b>"},
                {"question": "Missing answer"}
            ]),
        );
        let doc = fx.build(SchemaType::FaqPage);
        let entities = doc.get("mainEntity").unwrap().as_array().unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0]["acceptedAnswer"]["text"], json!("Yes"));
    }

    #[test]
    fn test_no_pairs_no_main_entity() {
        let doc = Fixture::new(item("<p>Nothing to ask</p>")).build(SchemaType::FaqPage);
        assert!(!doc.contains("mainEntity"));
    }
}
