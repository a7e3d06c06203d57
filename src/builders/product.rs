//! Product
//!
//! Price comes from the first of: the mapped `price`, then the commerce meta
//! fields `_sale_price`, `_price` and `_regular_price`. Subscription products
//! carry their billing period as a `UnitPriceSpecification`.

use serde_json::{json, Value};

use super::{BuildContext, SchemaBuilder};
use crate::normalize::{self, parse_price};
use crate::schema::SchemaDocument;

const PRICE_META_KEYS: &[&str] = &["_sale_price", "_price", "_regular_price"];

pub struct ProductBuilder;

impl SchemaBuilder for ProductBuilder {
    fn handled_properties(&self) -> &'static [&'static str] {
        &[
            "image",
            "sku",
            "gtin",
            "mpn",
            "brand",
            "price",
            "priceCurrency",
            "availability",
            "priceValidUntil",
            "subscriptionDuration",
            "ratingValue",
            "reviewCount",
        ]
    }

    fn enrich(&self, ctx: &BuildContext<'_>, document: &mut SchemaDocument) {
        document.set_missing("image", ctx.image());
        document.set_missing("sku", ctx.text_or_meta("sku", &["_sku"]).map(Into::into));
        document.set_missing(
            "gtin",
            ctx.text_or_meta("gtin", &["_gtin", "_global_unique_id"])
                .map(Into::into),
        );
        document.set_missing("mpn", ctx.text_or_meta("mpn", &["_mpn"]).map(Into::into));

        if let Some(brand) = ctx.text_or_meta("brand", &["_brand"]) {
            document.set("brand", json!({"@type": "Brand", "name": brand}));
        }

        if let Some(price) = product_price(ctx) {
            let mut offer = ctx.offer(price);
            if let Some(until) = ctx.date("priceValidUntil") {
                offer.insert("priceValidUntil".into(), json!(until));
            }
            if let Some(period) = subscription_period(ctx) {
                offer.insert(
                    "priceSpecification".into(),
                    json!({
                        "@type": "UnitPriceSpecification",
                        "price": normalize::format_price(price),
                        "priceCurrency": ctx.currency(),
                        "billingDuration": period,
                    }),
                );
            }
            document.set("offers", Value::Object(offer));
        }

        document.set_missing("aggregateRating", ctx.aggregate_rating());
    }
}

fn product_price(ctx: &BuildContext<'_>) -> Option<f64> {
    if let Some(price) = ctx.value("price").and_then(|v| parse_price(&v)) {
        return Some(price);
    }
    PRICE_META_KEYS
        .iter()
        .filter_map(|key| ctx.item.meta.get(*key))
        .find_map(parse_price)
}

/// Mapped period, else the subscription meta pair (`3` + `month`).
fn subscription_period(ctx: &BuildContext<'_>) -> Option<String> {
    if let Some(period) = ctx
        .value("subscriptionDuration")
        .and_then(|v| normalize::normalize_subscription_duration(&v))
    {
        return Some(period);
    }
    let unit = ctx.item.meta_str("_subscription_period")?;
    let interval = ctx
        .item
        .meta
        .get("_subscription_period_interval")
        .and_then(normalize::value_as_f64)
        .filter(|n| *n >= 1.0)
        .map(|n| n as u64)
        .unwrap_or(1);
    normalize::normalize_subscription_duration(&json!(format!("{} {}", interval, unit)))
}
