//! Schema type builders
//!
//! [`build`] assembles one document in four passes:
//! 1. base properties seeded straight from the content item
//! 2. the type's own properties, resolved through the mapping with
//!    extractor or default-rule fallbacks
//! 3. every other mapped property that is still missing
//! 4. recursive removal of empty leaves
//!
//! Builders never fail. Missing data means a missing property; whether that
//! matters is for the validator to say.

mod article;
mod course;
mod event;
mod faq;
mod howto;
mod job_posting;
mod local_business;
mod organization;
mod product;
mod recipe;
mod review;
mod video;

use serde_json::{json, Map, Value};
use tracing::warn;
use url::Url;

use crate::config::EngineConfig;
use crate::content::{Author, ContentItem, FieldMapping, ImageRef};
use crate::extractors::{detect_video, parse_video_url, TimeEstimate, VideoEmbed};
use crate::html;
use crate::normalize::{self, split_list};
use crate::providers::{Collaborators, OrganizationInfo};
use crate::resolver::{sanitize_text, sanitize_value, FieldResolver, ResolvedValue};
use crate::schema::{SchemaDocument, SchemaType};

/// Article-family headlines are cut to this many characters.
pub const HEADLINE_MAX_CHARS: usize = 110;
/// Descriptions derived from the body are cut to this many characters.
pub const DESCRIPTION_MAX_CHARS: usize = 160;

/// Mapped properties read by [`BuildContext::postal_address`].
pub(crate) const ADDRESS_PROPERTIES: &[&str] = &[
    "streetAddress",
    "addressLocality",
    "addressRegion",
    "postalCode",
    "addressCountry",
];

/// Per-type composition step.
pub trait SchemaBuilder: Sync {
    /// Mapped properties this builder reads itself. The generic pass leaves
    /// them alone, since most of them end up nested or renamed.
    fn handled_properties(&self) -> &'static [&'static str] {
        &[]
    }

    fn enrich(&self, ctx: &BuildContext<'_>, document: &mut SchemaDocument);
}

fn builder_for(schema_type: SchemaType) -> &'static dyn SchemaBuilder {
    match schema_type {
        SchemaType::Article | SchemaType::BlogPosting | SchemaType::NewsArticle => {
            &article::ArticleBuilder
        }
        SchemaType::Product => &product::ProductBuilder,
        SchemaType::Recipe => &recipe::RecipeBuilder,
        SchemaType::HowTo => &howto::HowToBuilder,
        SchemaType::FaqPage => &faq::FaqBuilder,
        SchemaType::Event => &event::EventBuilder,
        SchemaType::Course => &course::CourseBuilder,
        SchemaType::LearningResource => &course::LearningResourceBuilder,
        SchemaType::VideoObject => &video::VideoBuilder,
        SchemaType::Review => &review::ReviewBuilder,
        SchemaType::LocalBusiness => &local_business::LocalBusinessBuilder,
        SchemaType::Organization => &organization::OrganizationBuilder,
        SchemaType::Person => &organization::PersonBuilder,
        SchemaType::JobPosting => &job_posting::JobPostingBuilder,
    }
}

/// Builds the document of `schema_type` for the item in `ctx`.
pub fn build(schema_type: SchemaType, ctx: &BuildContext<'_>) -> SchemaDocument {
    let builder = builder_for(schema_type);
    let mut document = seed_base(schema_type, ctx);
    builder.enrich(ctx, &mut document);
    apply_mapped_properties(ctx, builder.handled_properties(), &mut document);
    document.strip_empty();
    document
}

fn seed_base(schema_type: SchemaType, ctx: &BuildContext<'_>) -> SchemaDocument {
    let item = ctx.item;
    let mut document = SchemaDocument::new(schema_type);

    document.set("url", item.url.trim());

    let title = sanitize_text(&item.title);
    if schema_type.is_article() {
        document.set_missing(
            "headline",
            title.map(|t| Value::from(html::truncate_chars(&t, HEADLINE_MAX_CHARS))),
        );
    } else {
        document.set_missing("name", title.map(Value::from));
    }

    document.set_missing("description", ctx.description().map(Value::from));

    if schema_type.is_creative_work() {
        document.set_missing(
            "datePublished",
            item.published.map(|d| Value::from(d.to_rfc3339())),
        );
        document.set_missing(
            "dateModified",
            item.modified.map(|d| Value::from(d.to_rfc3339())),
        );
        document.set_missing("inLanguage", ctx.config.language.clone().map(Value::from));
    }

    document
}

fn apply_mapped_properties(
    ctx: &BuildContext<'_>,
    handled: &[&str],
    document: &mut SchemaDocument,
) {
    let pending: Vec<&str> = ctx
        .mapping
        .properties()
        .filter(|p| !p.starts_with('@') && !handled.contains(p) && !document.contains(p))
        .collect();
    for property in pending {
        document.set_missing(property, ctx.value(property));
    }
}

/// Everything a builder may consult for one content item.
pub struct BuildContext<'a> {
    pub item: &'a ContentItem,
    pub mapping: &'a FieldMapping,
    pub resolver: &'a FieldResolver,
    pub config: &'a EngineConfig,
    pub collaborators: &'a Collaborators,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        item: &'a ContentItem,
        mapping: &'a FieldMapping,
        resolver: &'a FieldResolver,
        config: &'a EngineConfig,
        collaborators: &'a Collaborators,
    ) -> Self {
        Self {
            item,
            mapping,
            resolver,
            config,
            collaborators,
        }
    }

    pub fn resolve(&self, property: &str) -> Option<ResolvedValue> {
        self.resolver.resolve(self.item, property, self.mapping)
    }

    pub fn text(&self, property: &str) -> Option<String> {
        self.resolve(property)?.to_text()
    }

    pub fn value(&self, property: &str) -> Option<Value> {
        self.resolve(property).map(|v| v.to_value())
    }

    pub fn number(&self, property: &str) -> Option<f64> {
        self.resolve(property)?.as_f64()
    }

    pub fn raw(&self, property: &str) -> Option<Value> {
        self.resolver.resolve_raw(self.item, property, self.mapping)
    }

    /// Mapped value as a list (arrays, or comma/newline separated text).
    pub fn list(&self, property: &str) -> Vec<String> {
        self.value(property)
            .map(|v| split_list(&v))
            .unwrap_or_default()
    }

    pub fn date(&self, property: &str) -> Option<String> {
        self.text(property).and_then(|t| normalize::normalize_date(&t))
    }

    /// First usable value among the item's own meta fields.
    pub fn meta(&self, keys: &[&str]) -> Option<ResolvedValue> {
        keys.iter()
            .filter_map(|key| self.item.meta.get(*key))
            .find_map(|v| sanitize_value(v.clone()))
    }

    /// Mapped property, falling back to meta fields.
    pub fn resolve_or_meta(&self, property: &str, meta_keys: &[&str]) -> Option<ResolvedValue> {
        self.resolve(property).or_else(|| self.meta(meta_keys))
    }

    pub fn text_or_meta(&self, property: &str, meta_keys: &[&str]) -> Option<String> {
        self.resolve_or_meta(property, meta_keys)?.to_text()
    }

    pub fn body_text(&self) -> String {
        html::strip_tags(&self.item.body)
    }

    /// Excerpt, else the start of the body text.
    pub fn description(&self) -> Option<String> {
        if let Some(excerpt) = self.item.excerpt.as_deref().and_then(sanitize_text) {
            return Some(excerpt);
        }
        let body = self.body_text();
        (!body.is_empty()).then(|| html::truncate_chars(&body, DESCRIPTION_MAX_CHARS))
    }

    pub fn primary_term(&self, taxonomy: &str) -> Option<String> {
        self.item
            .primary_term(taxonomy)
            .and_then(|t| sanitize_text(&t.name))
    }

    pub fn term_names(&self, taxonomy: &str) -> Vec<String> {
        self.item
            .terms(taxonomy)
            .iter()
            .filter_map(|t| sanitize_text(&t.name))
            .collect()
    }

    /// Mapped image, featured image, first body image, then the fallback.
    pub fn image(&self) -> Option<Value> {
        match self.value("image") {
            Some(Value::String(url)) => {
                if let Some(url) = self.absolute_url(&url) {
                    return Some(image_object(&ImageRef::new(url)));
                }
            }
            Some(Value::Object(mut obj)) => {
                obj.entry("@type").or_insert_with(|| json!("ImageObject"));
                return Some(Value::Object(obj));
            }
            _ => {}
        }

        if let Some(featured) = self
            .item
            .featured_image
            .as_ref()
            .filter(|i| !i.url.trim().is_empty())
        {
            return Some(image_object(featured));
        }

        if let Some(url) =
            html::first_image(&self.item.body).and_then(|src| self.absolute_url(&src))
        {
            return Some(image_object(&ImageRef::new(url)));
        }

        self.fallback_image().map(|img| image_object(&img))
    }

    /// URL of the resolved image, for properties that take a plain URL.
    pub fn image_url(&self) -> Option<String> {
        self.image()?
            .get("url")
            .and_then(|u| u.as_str())
            .map(String::from)
    }

    fn fallback_image(&self) -> Option<ImageRef> {
        if let Some(provider) = &self.collaborators.fallback_image {
            match provider.fallback_image() {
                Ok(Some(image)) => return Some(image),
                Ok(None) => {}
                Err(e) => warn!("{}", e),
            }
        }
        self.config
            .fallback_image
            .clone()
            .filter(|i| !i.url.trim().is_empty())
    }

    /// Resolves `src` against the item URL when it is relative.
    pub fn absolute_url(&self, src: &str) -> Option<String> {
        let src = src.trim();
        if src.is_empty() {
            return None;
        }
        if Url::parse(src).is_ok() {
            return Some(src.to_string());
        }
        Some(
            Url::parse(&self.item.url)
                .and_then(|base| base.join(src))
                .map(String::from)
                .unwrap_or_else(|_| src.to_string()),
        )
    }

    /// Mapped author name, else the item's author.
    pub fn author(&self) -> Option<Value> {
        if let Some(name) = self.text("author") {
            return Some(person_value(&name, self.text("authorUrl").as_deref()));
        }
        let author: &Author = self.item.author.as_ref()?;
        let name = sanitize_text(&author.name)?;
        Some(person_value(&name, author.url.as_deref()))
    }

    /// Provider first, then the configured organization.
    pub fn organization(&self) -> Option<OrganizationInfo> {
        if let Some(provider) = &self.collaborators.organization {
            match provider.organization() {
                Ok(Some(info)) if info.is_usable() => return Some(info),
                Ok(_) => {}
                Err(e) => warn!("{}", e),
            }
        }
        self.config.organization.clone().filter(|o| o.is_usable())
    }

    pub fn publisher(&self) -> Option<Value> {
        self.organization().map(|o| organization_value(&o))
    }

    /// Video referenced by the mapping or embedded in the body.
    pub fn video(&self) -> Option<VideoEmbed> {
        ["embedUrl", "contentUrl", "video"]
            .iter()
            .filter_map(|p| self.text(p))
            .find_map(|url| parse_video_url(&url))
            .or_else(|| detect_video(&self.item.body))
    }

    /// Length of an embedded video according to the metadata provider.
    pub fn video_seconds(&self, embed: &VideoEmbed) -> Option<u32> {
        let provider = self.collaborators.video.as_ref()?;
        match provider.metadata(embed.platform, &embed.id) {
            Ok(meta) => meta.map(|m| m.duration_seconds).filter(|s| *s > 0),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    /// Reading time plus video time, after the time hook.
    pub fn time_estimate(&self) -> TimeEstimate {
        let video_seconds = self.video().and_then(|v| self.video_seconds(&v));
        let estimate =
            TimeEstimate::for_body(&self.item.body, video_seconds, self.config.words_per_minute);
        match &self.collaborators.time_required {
            Some(hook) => estimate.adjusted(|minutes| hook.adjust(minutes, self.item)),
            None => estimate,
        }
    }

    /// Mapped currency when it is a valid code, else the configured default.
    pub fn currency(&self) -> String {
        self.text("priceCurrency")
            .and_then(|c| normalize::normalize_currency(&c))
            .unwrap_or_else(|| self.config.currency())
    }

    /// `PostalAddress` from the mapped address parts.
    pub fn postal_address(&self) -> Option<Value> {
        let mut address = Map::new();
        for property in ADDRESS_PROPERTIES {
            if let Some(text) = self.text(property) {
                address.insert(property.to_string(), Value::String(text));
            }
        }
        if address.is_empty() {
            return None;
        }
        address.insert("@type".to_string(), json!("PostalAddress"));
        Some(Value::Object(address))
    }

    /// `AggregateRating` from mapped or commerce meta rating fields.
    pub fn aggregate_rating(&self) -> Option<Value> {
        let rating = self
            .resolve_or_meta("ratingValue", &["_wc_average_rating", "rating_average"])?
            .as_f64()
            .filter(|r| *r > 0.0)?;
        let count = self
            .resolve_or_meta("reviewCount", &["_wc_review_count", "rating_count"])
            .and_then(|c| c.as_f64())
            .filter(|c| *c >= 1.0)?;
        Some(json!({
            "@type": "AggregateRating",
            "ratingValue": rating,
            "reviewCount": count as u64,
        }))
    }

    /// `Offer` for a price in the resolved currency.
    pub fn offer(&self, price: f64) -> Map<String, Value> {
        let mut offer = Map::new();
        offer.insert("@type".into(), json!("Offer"));
        offer.insert("price".into(), json!(normalize::format_price(price)));
        offer.insert("priceCurrency".into(), json!(self.currency()));
        offer.insert("url".into(), json!(self.item.url.trim()));
        if let Some(availability) = self.text_or_meta("availability", &["_stock_status"]) {
            offer.insert(
                "availability".into(),
                json!(normalize::normalize_availability(&availability)),
            );
        }
        offer
    }
}

pub fn image_object(image: &ImageRef) -> Value {
    let mut obj = Map::new();
    obj.insert("@type".into(), json!("ImageObject"));
    obj.insert("url".into(), json!(image.url.trim()));
    if let Some(width) = image.width {
        obj.insert("width".into(), json!(width));
    }
    if let Some(height) = image.height {
        obj.insert("height".into(), json!(height));
    }
    Value::Object(obj)
}

pub fn person_value(name: &str, url: Option<&str>) -> Value {
    json!({
        "@type": "Person",
        "name": name,
        "url": url.map(str::trim).unwrap_or_default(),
    })
}

pub fn organization_value(info: &OrganizationInfo) -> Value {
    json!({
        "@type": "Organization",
        "name": info.name.trim(),
        "url": info.url.as_deref().map(str::trim).unwrap_or_default(),
        "logo": info.logo.as_deref().map(|logo| image_object(&ImageRef::new(logo.trim()))),
    })
}


#[cfg(test)]
mod tests {
    use super::fixture::{item, Fixture};
    use super::*;
    use crate::error::CollaboratorError;
    use crate::providers::OrganizationProvider;
    use crate::schema::has_no_empty_leaves;
    use pretty_assertions::assert_eq;

    struct FailingOrganization;

    impl OrganizationProvider for FailingOrganization {
        fn organization(&self) -> Result<Option<OrganizationInfo>, CollaboratorError> {
            Err(CollaboratorError::new("organization", "settings unavailable"))
        }
    }

    #[test]
    fn test_base_seeding() {
        let mut it = item("<p>Body text here.</p>");
        it.title = format!("{} end", "word ".repeat(40));
        let fx = Fixture::new(it);
        let doc = fx.build(SchemaType::Article);
        let headline = doc.get_str("headline").unwrap();
        assert!(headline.chars().count() <= HEADLINE_MAX_CHARS);
        assert!(!doc.contains("name"));
        assert_eq!(doc.get_str("description"), Some("Body text here."));
        assert_eq!(doc.get_str("url"), Some("https://example.test/hello/"));

        let doc = fx.build(SchemaType::Product);
        assert!(doc.contains("name"));
        assert!(!doc.contains("headline"));
    }

    #[test]
    fn test_excerpt_wins_for_description() {
        let mut it = item("<p>Body</p>");
        it.excerpt = Some("<em>Short</em> summary".into());
        let fx = Fixture::new(it);
        assert_eq!(fx.ctx().description().as_deref(), Some("Short summary"));
    }

    #[test]
    fn test_image_chain() {
        let mut it = item(r#"<p><img src="/img/body.jpg"></p>"#);
        let fx = Fixture::new(it.clone());
        assert_eq!(
            fx.ctx().image_url().as_deref(),
            Some("https://example.test/img/body.jpg")
        );

        it.featured_image = Some(ImageRef {
            url: "https://cdn.test/featured.jpg".into(),
            width: Some(800),
            height: Some(600),
        });
        let fx = Fixture::new(it.clone());
        assert_eq!(
            fx.ctx().image(),
            Some(json!({
                "@type": "ImageObject",
                "url": "https://cdn.test/featured.jpg",
                "width": 800,
                "height": 600
            }))
        );

        let fx = Fixture::new(it).with_mapping(
            FieldMapping::new().map("image", "custom:url:https://cdn.test/mapped.png"),
        );
        assert_eq!(
            fx.ctx().image_url().as_deref(),
            Some("https://cdn.test/mapped.png")
        );
    }

    #[test]
    fn test_fallback_image_provider_then_config() {
        let mut fx = Fixture::new(item("<p>No images</p>"));
        fx.config.fallback_image = Some(ImageRef::new("https://example.test/config.jpg"));
        assert_eq!(
            fx.ctx().image_url().as_deref(),
            Some("https://example.test/config.jpg")
        );

        fx.collaborators.fallback_image =
            Some(Box::new(ImageRef::new("https://example.test/provider.jpg")));
        assert_eq!(
            fx.ctx().image_url().as_deref(),
            Some("https://example.test/provider.jpg")
        );
    }

    #[test]
    fn test_failing_organization_falls_back_to_config() {
        let mut fx = Fixture::new(item(""));
        fx.collaborators.organization = Some(Box::new(FailingOrganization));
        assert_eq!(fx.ctx().publisher(), None);

        fx.config.organization = Some(OrganizationInfo {
            name: "Acme".into(),
            url: Some("https://acme.test".into()),
            logo: None,
        });
        assert_eq!(
            fx.ctx().publisher(),
            Some(json!({
                "@type": "Organization",
                "name": "Acme",
                "url": "https://acme.test",
                "logo": null
            }))
        );
    }

    #[test]
    fn test_generic_pass_sets_remaining_mapped_properties() {
        let fx = Fixture::new(item("<p>x</p>")).with_mapping(
            FieldMapping::new()
                .map("copyrightYear", "custom:number:2024")
                .map("genre", "custom:text:Essay")
                .map("description", "custom:text:ignored"),
        );
        let doc = fx.build(SchemaType::BlogPosting);
        assert_eq!(doc.get("copyrightYear"), Some(&json!(2024)));
        assert_eq!(doc.get_str("genre"), Some("Essay"));
        assert_eq!(doc.get_str("description"), Some("x"));
    }

    #[test]
    fn test_every_type_builds_without_empty_leaves() {
        let fx = Fixture::new(ContentItem::new(9, "post"));
        for schema_type in SchemaType::ALL {
            let doc = fx.build(schema_type);
            assert_eq!(doc.schema_type(), Some(schema_type.as_str()));
            assert!(has_no_empty_leaves(&doc.to_value()), "{}", schema_type);
        }
    }
}
