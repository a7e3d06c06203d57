//! HowTo

use serde_json::{json, Value};

use super::{BuildContext, SchemaBuilder};
use crate::extractors::extract_steps;
use crate::normalize::{format_price, normalize_time_duration, parse_price};
use crate::schema::SchemaDocument;

pub struct HowToBuilder;

impl SchemaBuilder for HowToBuilder {
    fn handled_properties(&self) -> &'static [&'static str] {
        &["image", "step", "totalTime", "supply", "tool", "estimatedCost", "priceCurrency"]
    }

    fn enrich(&self, ctx: &BuildContext<'_>, document: &mut SchemaDocument) {
        document.set_missing("image", ctx.image());

        let url = ctx.item.url.trim();
        let steps: Vec<Value> = extract_steps(&ctx.item.body)
            .into_iter()
            .map(|step| {
                let anchor = (!url.is_empty()).then(|| format!("{}#step-{}", url, step.position));
                json!({
                    "@type": "HowToStep",
                    "position": step.position,
                    "name": step.name,
                    "text": step.text,
                    "url": anchor,
                })
            })
            .collect();
        document.set("step", steps);

        // Mapped duration, else the reading and viewing estimate
        let total_time = ctx
            .value("totalTime")
            .and_then(|v| normalize_time_duration(&v))
            .or_else(|| ctx.time_estimate().to_iso());
        document.set_missing("totalTime", total_time.map(Into::into));

        for (property, item_type) in [("supply", "HowToSupply"), ("tool", "HowToTool")] {
            let items: Vec<Value> = ctx
                .list(property)
                .into_iter()
                .map(|name| json!({"@type": item_type, "name": name}))
                .collect();
            document.set(property, items);
        }

        if let Some(cost) = ctx.value("estimatedCost").and_then(|v| parse_price(&v)) {
            document.set(
                "estimatedCost",
                json!({
                    "@type": "MonetaryAmount",
                    "currency": ctx.currency(),
                    "value": format_price(cost),
                }),
            );
        }
    }
}
