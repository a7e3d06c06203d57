//! Review

use serde_json::json;

use super::{BuildContext, SchemaBuilder};
use crate::schema::SchemaDocument;

const DEFAULT_BEST_RATING: f64 = 5.0;
const DEFAULT_WORST_RATING: f64 = 1.0;

pub struct ReviewBuilder;

impl SchemaBuilder for ReviewBuilder {
    fn handled_properties(&self) -> &'static [&'static str] {
        &[
            "image",
            "author",
            "authorUrl",
            "itemReviewed",
            "itemReviewedType",
            "ratingValue",
            "bestRating",
            "worstRating",
            "reviewBody",
        ]
    }

    fn enrich(&self, ctx: &BuildContext<'_>, document: &mut SchemaDocument) {
        document.set_missing("image", ctx.image());
        document.set_missing("author", ctx.author());
        document.set_missing("publisher", ctx.publisher());

        if let Some(name) = ctx.text("itemReviewed") {
            let item_type = ctx
                .text("itemReviewedType")
                .filter(|t| t.chars().all(|c| c.is_ascii_alphanumeric()))
                .unwrap_or_else(|| "Thing".into());
            document.set("itemReviewed", json!({"@type": item_type, "name": name}));
        }

        if let Some(rating) = ctx.number("ratingValue") {
            let best = ctx.number("bestRating").unwrap_or(DEFAULT_BEST_RATING);
            let worst = ctx.number("worstRating").unwrap_or(DEFAULT_WORST_RATING);
            document.set(
                "reviewRating",
                json!({
                    "@type": "Rating",
                    "ratingValue": rating,
                    "bestRating": best,
                    "worstRating": worst,
                }),
            );
        }

        let body = ctx.text("reviewBody").unwrap_or_else(|| ctx.body_text());
        document.set("reviewBody", body);
    }
}
