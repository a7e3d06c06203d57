//! Article, BlogPosting and NewsArticle

use serde_json::json;

use super::{BuildContext, SchemaBuilder};
use crate::html;
use crate::schema::SchemaDocument;

pub struct ArticleBuilder;

impl SchemaBuilder for ArticleBuilder {
    fn handled_properties(&self) -> &'static [&'static str] {
        &["image", "author", "authorUrl", "articleSection", "keywords"]
    }

    fn enrich(&self, ctx: &BuildContext<'_>, document: &mut SchemaDocument) {
        document.set_missing("image", ctx.image());
        document.set_missing("author", ctx.author());
        document.set_missing("publisher", ctx.publisher());

        let url = ctx.item.url.trim();
        if !url.is_empty() {
            document.set("mainEntityOfPage", json!({"@type": "WebPage", "@id": url}));
        }

        let section = ctx
            .text("articleSection")
            .or_else(|| ctx.primary_term("category"));
        document.set_missing("articleSection", section.map(Into::into));

        let keywords = ctx.text("keywords").or_else(|| {
            let tags = ctx.term_names("post_tag");
            (!tags.is_empty()).then(|| tags.join(", "))
        });
        document.set_missing("keywords", keywords.map(Into::into));

        let words = html::word_count(&ctx.item.body);
        if words > 0 {
            document.set("wordCount", words);
        }
    }
}
