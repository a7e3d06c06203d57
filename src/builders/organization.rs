//! Organization and Person

use serde_json::{json, Value};

use super::local_business::same_as;
use super::{image_object, organization_value, BuildContext, SchemaBuilder};
use crate::content::ImageRef;
use crate::resolver::looks_like_email;
use crate::schema::SchemaDocument;

const DEFAULT_CONTACT_TYPE: &str = "customer service";

pub struct OrganizationBuilder;

impl SchemaBuilder for OrganizationBuilder {
    fn handled_properties(&self) -> &'static [&'static str] {
        &[
            "logo",
            "sameAs",
            "telephone",
            "email",
            "contactType",
            "streetAddress",
            "addressLocality",
            "addressRegion",
            "postalCode",
            "addressCountry",
        ]
    }

    fn enrich(&self, ctx: &BuildContext<'_>, document: &mut SchemaDocument) {
        let org = ctx.organization();
        if let Some(org) = &org {
            document.set_missing("name", Some(org.name.trim().into()));
            let has_url = document.get_str("url").is_some_and(|u| !u.trim().is_empty());
            if let (false, Some(url)) = (has_url, &org.url) {
                document.set("url", url.trim());
            }
        }

        let logo = ctx
            .text("logo")
            .and_then(|l| ctx.absolute_url(&l))
            .or_else(|| org.as_ref().and_then(|o| o.logo.clone()))
            .map(|url| image_object(&ImageRef::new(url)));
        document.set_missing("logo", logo);
        document.set("sameAs", same_as(ctx));
        document.set_missing("address", ctx.postal_address());

        let telephone = ctx.text("telephone");
        let email = ctx.text("email").filter(|e| looks_like_email(e));
        if telephone.is_some() || email.is_some() {
            document.set(
                "contactPoint",
                json!({
                    "@type": "ContactPoint",
                    "telephone": telephone,
                    "email": email,
                    "contactType": ctx
                        .text("contactType")
                        .unwrap_or_else(|| DEFAULT_CONTACT_TYPE.into()),
                }),
            );
        }
    }
}

pub struct PersonBuilder;

impl SchemaBuilder for PersonBuilder {
    fn handled_properties(&self) -> &'static [&'static str] {
        &["image", "jobTitle", "worksFor", "sameAs", "email"]
    }

    fn enrich(&self, ctx: &BuildContext<'_>, document: &mut SchemaDocument) {
        document.set_missing("image", ctx.image());
        document.set_missing("jobTitle", ctx.text("jobTitle").map(Into::into));

        let works_for = ctx
            .text("worksFor")
            .map(|name| json!({"@type": "Organization", "name": name}))
            .or_else(|| ctx.organization().map(|o| organization_value(&o)));
        document.set_missing("worksFor", works_for);

        document.set("sameAs", same_as(ctx));
        document.set_missing(
            "email",
            ctx.text("email").filter(|e| looks_like_email(e)).map(Value::from),
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::builders::fixture::{item, Fixture};
    use crate::content::{ContentItem, FieldMapping};
    use crate::providers::OrganizationInfo;
    use crate::schema::SchemaType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn acme() -> OrganizationInfo {
        OrganizationInfo {
            name: "Acme".into(),
            url: Some("https://acme.test".into()),
            logo: Some("https://acme.test/logo.png".into()),
        }
    }

    #[test]
    fn test_organization_from_provider_when_untitled() {
        let mut fx = Fixture::new(ContentItem::new(3, "page")).with_mapping(
            FieldMapping::new()
                .map("telephone", "custom:text:+1 555 0100")
                .map("sameAs", "custom:url:https://social.test/acme"),
        );
        fx.config.organization = Some(acme());
        let doc = fx.build(SchemaType::Organization);
        assert_eq!(doc.get_str("name"), Some("Acme"));
        assert_eq!(doc.get_str("url"), Some("https://acme.test"));
        assert_eq!(
            doc.get("logo"),
            Some(&json!({"@type": "ImageObject", "url": "https://acme.test/logo.png"}))
        );
        assert_eq!(
            doc.get("contactPoint"),
            Some(&json!({
                "@type": "ContactPoint",
                "telephone": "+1 555 0100",
                "contactType": "customer service"
            }))
        );
        assert_eq!(doc.get("sameAs"), Some(&json!(["https://social.test/acme"])));
    }

    #[test]
    fn test_title_names_the_organization() {
        let mut fx = Fixture::new(item(""));
        fx.config.organization = Some(acme());
        let doc = fx.build(SchemaType::Organization);
        assert_eq!(doc.get_str("name"), Some("Hello & welcome"));
        assert!(!doc.contains("contactPoint"));
    }

    #[test]
    fn test_person() {
        let mut fx = Fixture::new(item("")).with_mapping(
            FieldMapping::new()
                .map("jobTitle", "custom:text:Editor")
                .map("email", "custom:text:not-an-email"),
        );
        fx.config.organization = Some(acme());
        let doc = fx.build(SchemaType::Person);
        assert_eq!(doc.get_str("jobTitle"), Some("Editor"));
        assert_eq!(doc.get("worksFor").unwrap()["name"], json!("Acme"));
        assert!(!doc.contains("email"));
    }
}
