//! LocalBusiness

use serde_json::{json, Value};

use super::{BuildContext, SchemaBuilder};
use crate::resolver::{looks_like_email, looks_like_url};
use crate::schema::SchemaDocument;

pub struct LocalBusinessBuilder;

impl SchemaBuilder for LocalBusinessBuilder {
    fn handled_properties(&self) -> &'static [&'static str] {
        &[
            "image",
            "telephone",
            "email",
            "priceRange",
            "latitude",
            "longitude",
            "openingHours",
            "sameAs",
            "streetAddress",
            "addressLocality",
            "addressRegion",
            "postalCode",
            "addressCountry",
        ]
    }

    fn enrich(&self, ctx: &BuildContext<'_>, document: &mut SchemaDocument) {
        document.set_missing("image", ctx.image());
        document.set_missing("address", ctx.postal_address());
        document.set_missing("telephone", ctx.text("telephone").map(Into::into));
        document.set_missing(
            "email",
            ctx.text("email").filter(|e| looks_like_email(e)).map(Into::into),
        );
        document.set_missing("priceRange", ctx.text("priceRange").map(Into::into));
        document.set_missing("geo", geo_coordinates(ctx));
        document.set("openingHours", ctx.list("openingHours"));
        document.set("sameAs", same_as(ctx));
    }
}

/// `GeoCoordinates` when both parts are present and in range.
fn geo_coordinates(ctx: &BuildContext<'_>) -> Option<Value> {
    let latitude = ctx.number("latitude").filter(|l| (-90.0..=90.0).contains(l))?;
    let longitude = ctx.number("longitude").filter(|l| (-180.0..=180.0).contains(l))?;
    Some(json!({
        "@type": "GeoCoordinates",
        "latitude": latitude,
        "longitude": longitude,
    }))
}

/// Profile URLs from the mapped `sameAs` list. Non-URLs are dropped.
pub(crate) fn same_as(ctx: &BuildContext<'_>) -> Vec<String> {
    ctx.list("sameAs")
        .into_iter()
        .filter(|u| looks_like_url(u))
        .collect()
}
