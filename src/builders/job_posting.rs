//! JobPosting
//!
//! `title` mirrors the item title and `description` carries the full body
//! text rather than the short summary the other types use.

use serde_json::{json, Value};

use super::{organization_value, BuildContext, SchemaBuilder};
use crate::normalize::{normalize_currency, normalize_employment_type, value_as_f64};
use crate::schema::SchemaDocument;

const SALARY_UNITS: &[&str] = &["HOUR", "DAY", "WEEK", "MONTH", "YEAR"];

pub struct JobPostingBuilder;

impl SchemaBuilder for JobPostingBuilder {
    fn handled_properties(&self) -> &'static [&'static str] {
        &[
            "datePosted",
            "validThrough",
            "employmentType",
            "hiringOrganization",
            "hiringOrganizationUrl",
            "jobLocationType",
            "remote",
            "baseSalary",
            "salaryMin",
            "salaryMax",
            "salaryUnit",
            "salaryCurrency",
            "priceCurrency",
            "directApply",
            "streetAddress",
            "addressLocality",
            "addressRegion",
            "postalCode",
            "addressCountry",
        ]
    }

    fn enrich(&self, ctx: &BuildContext<'_>, document: &mut SchemaDocument) {
        if let Some(name) = document.remove("name") {
            document.set("title", name);
        }
        let body = ctx.body_text();
        if !body.is_empty() {
            document.set("description", body);
        }

        let posted = ctx
            .date("datePosted")
            .or_else(|| ctx.item.published.map(|d| d.to_rfc3339()));
        document.set_missing("datePosted", posted.map(Into::into));
        document.set_missing("validThrough", ctx.date("validThrough").map(Into::into));

        let employment: Vec<String> = ctx
            .list("employmentType")
            .iter()
            .filter_map(|t| normalize_employment_type(t))
            .collect();
        match employment.len() {
            0 => {}
            1 => document.set("employmentType", employment[0].as_str()),
            _ => document.set("employmentType", employment),
        }

        let hiring = ctx
            .text("hiringOrganization")
            .map(|name| {
                json!({
                    "@type": "Organization",
                    "name": name,
                    "sameAs": ctx.text("hiringOrganizationUrl"),
                })
            })
            .or_else(|| ctx.organization().map(|o| organization_value(&o)));
        document.set_missing("hiringOrganization", hiring);

        if is_remote(ctx) {
            document.set("jobLocationType", "TELECOMMUTE");
        }
        if let Some(address) = ctx.postal_address() {
            document.set("jobLocation", json!({"@type": "Place", "address": address}));
        }

        document.set_missing("baseSalary", base_salary(ctx));
        document.set_missing("directApply", ctx.value("directApply").filter(Value::is_boolean));
    }
}

fn is_remote(ctx: &BuildContext<'_>) -> bool {
    if let Some(kind) = ctx.text("jobLocationType") {
        let kind = kind.to_ascii_lowercase();
        return kind.contains("telecommute") || kind.contains("remote");
    }
    matches!(ctx.value("remote"), Some(Value::Bool(true)))
}

/// `MonetaryAmount` with a single value or a min/max range.
fn base_salary(ctx: &BuildContext<'_>) -> Option<Value> {
    let exact = ctx.value("baseSalary").as_ref().and_then(value_as_f64);
    let min = ctx.number("salaryMin");
    let max = ctx.number("salaryMax");

    let mut quantity = serde_json::Map::new();
    quantity.insert("@type".into(), json!("QuantitativeValue"));
    match (exact, min, max) {
        (Some(value), _, _) => {
            quantity.insert("value".into(), json!(value));
        }
        (None, None, None) => return None,
        (None, min, max) => {
            if let Some(min) = min {
                quantity.insert("minValue".into(), json!(min));
            }
            if let Some(max) = max {
                quantity.insert("maxValue".into(), json!(max));
            }
        }
    }
    let unit = ctx
        .text("salaryUnit")
        .map(|u| u.trim().to_ascii_uppercase())
        .filter(|u| SALARY_UNITS.contains(&u.as_str()))
        .unwrap_or_else(|| "YEAR".into());
    quantity.insert("unitText".into(), json!(unit));

    let currency = ctx
        .text("salaryCurrency")
        .and_then(|c| normalize_currency(&c))
        .unwrap_or_else(|| ctx.currency());
    Some(json!({
        "@type": "MonetaryAmount",
        "currency": currency,
        "value": Value::Object(quantity),
    }))
}

#[cfg(test)]
mod tests {
    use crate::builders::fixture::{item, Fixture};
    use crate::content::FieldMapping;
    use crate::schema::SchemaType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_on_site_job() {
        let mut fx = Fixture::new(item("<p>We are hiring.</p><p>Apply today.</p>")).with_mapping(
            FieldMapping::new()
                .map("employmentType", "custom:text:Full time")
                .map("hiringOrganization", "custom:text:Acme")
                .map("addressLocality", "custom:text:Espoo")
                .map("salaryMin", "custom:number:40000")
                .map("salaryMax", "custom:number:55000")
                .map("salaryCurrency", "custom:text:eur")
                .map("validThrough", "custom:date:2025-01-31"),
        );
        fx.item.published = "2024-12-01T09:00:00Z".parse().ok();

        let doc = fx.build(SchemaType::JobPosting);
        assert_eq!(doc.get_str("title"), Some("Hello & welcome"));
        assert!(!doc.contains("name"));
        assert_eq!(doc.get_str("description"), Some("We are hiring. Apply today."));
        assert_eq!(doc.get_str("datePosted"), Some("2024-12-01T09:00:00+00:00"));
        assert_eq!(doc.get_str("validThrough"), Some("2025-01-31"));
        assert_eq!(doc.get_str("employmentType"), Some("FULL_TIME"));
        assert_eq!(
            doc.get("jobLocation"),
            Some(&json!({
                "@type": "Place",
                "address": {"@type": "PostalAddress", "addressLocality": "Espoo"}
            }))
        );
        assert_eq!(
            doc.get("baseSalary"),
            Some(&json!({
                "@type": "MonetaryAmount",
                "currency": "EUR",
                "value": {
                    "@type": "QuantitativeValue",
                    "minValue": 40000.0,
                    "maxValue": 55000.0,
                    "unitText": "YEAR"
                }
            }))
        );
        assert!(!doc.contains("jobLocationType"));
    }

    #[test]
    fn test_remote_job() {
        let fx = Fixture::new(item("<p>Remote role.</p>")).with_mapping(
            FieldMapping::new()
                .map("remote", "custom:boolean:yes")
                .map("employmentType", "custom:text:contract, part-time")
                .map("directApply", "custom:boolean:true"),
        );
        let doc = fx.build(SchemaType::JobPosting);
        assert_eq!(doc.get_str("jobLocationType"), Some("TELECOMMUTE"));
        assert!(!doc.contains("jobLocation"));
        assert_eq!(doc.get("employmentType"), Some(&json!(["CONTRACTOR", "PART_TIME"])));
        assert_eq!(doc.get("directApply"), Some(&json!(true)));
    }
}
