//! Course and LearningResource
//!
//! Both carry a `timeRequired` estimate. LearningResource is additionally
//! classified (`learningResourceType`, `interactivityType`) unless the
//! mapping supplies those values.

use serde_json::{json, Value};

use super::{BuildContext, SchemaBuilder};
use crate::extractors::classify_content;
use crate::normalize::parse_price;
use crate::schema::SchemaDocument;

pub struct CourseBuilder;

impl SchemaBuilder for CourseBuilder {
    fn handled_properties(&self) -> &'static [&'static str] {
        &[
            "image",
            "author",
            "authorUrl",
            "provider",
            "courseMode",
            "price",
            "priceCurrency",
            "availability",
            "teaches",
        ]
    }

    fn enrich(&self, ctx: &BuildContext<'_>, document: &mut SchemaDocument) {
        document.set_missing("image", ctx.image());
        document.set_missing("author", ctx.author());

        let provider = ctx
            .text("provider")
            .map(|name| json!({"@type": "Organization", "name": name}))
            .or_else(|| ctx.publisher());
        document.set_missing("provider", provider);

        let estimate = ctx.time_estimate().to_iso();
        document.set_missing("timeRequired", estimate.clone().map(Into::into));
        document.set(
            "hasCourseInstance",
            json!({
                "@type": "CourseInstance",
                "courseMode": ctx.text("courseMode").unwrap_or_else(|| "online".into()),
                "courseWorkload": estimate,
            }),
        );

        if let Some(price) = ctx.value("price").and_then(|v| parse_price(&v)) {
            let mut offer = ctx.offer(price);
            let category = if price == 0.0 { "Free" } else { "Paid" };
            offer.insert("category".into(), json!(category));
            document.set("offers", Value::Object(offer));
        }

        document.set("teaches", ctx.list("teaches"));
    }
}

pub struct LearningResourceBuilder;

impl SchemaBuilder for LearningResourceBuilder {
    fn handled_properties(&self) -> &'static [&'static str] {
        &[
            "image",
            "author",
            "authorUrl",
            "learningResourceType",
            "interactivityType",
            "isAccessibleForFree",
            "teaches",
        ]
    }

    fn enrich(&self, ctx: &BuildContext<'_>, document: &mut SchemaDocument) {
        document.set_missing("image", ctx.image());
        document.set_missing("author", ctx.author());
        document.set_missing("publisher", ctx.publisher());

        let video_seconds = ctx.video().and_then(|v| ctx.video_seconds(&v));
        let classification =
            classify_content(&ctx.item.body, video_seconds, ctx.config.words_per_minute);
        document.set(
            "learningResourceType",
            ctx.text("learningResourceType")
                .unwrap_or_else(|| classification.resource_kind.as_str().into()),
        );
        document.set(
            "interactivityType",
            ctx.text("interactivityType")
                .unwrap_or_else(|| classification.interactivity.as_str().into()),
        );

        document.set_missing("timeRequired", ctx.time_estimate().to_iso().map(Into::into));
        document.set_missing("isAccessibleForFree", ctx.value("isAccessibleForFree"));
        document.set("teaches", ctx.list("teaches"));
    }
}
