//! Structural validation of built documents
//!
//! Errors are missing required properties and malformed values (dates,
//! durations, out-of-range numbers). Warnings are missing recommended
//! properties. Reports are advisory and the document is never touched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{is_iso_date, is_iso_duration, value_as_f64};
use crate::schema::{SchemaDocument, SchemaType};

const DATE_KEYS: &[&str] = &[
    "datePublished",
    "dateModified",
    "dateCreated",
    "uploadDate",
    "startDate",
    "endDate",
    "datePosted",
    "validThrough",
    "validFrom",
    "priceValidUntil",
    "expires",
];

const DURATION_KEYS: &[&str] = &[
    "duration",
    "totalTime",
    "prepTime",
    "cookTime",
    "performTime",
    "timeRequired",
    "courseWorkload",
    "billingDuration",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

struct Rules {
    required: &'static [&'static str],
    recommended: &'static [&'static str],
}

fn rules_for(schema_type: SchemaType) -> Rules {
    let (required, recommended): (&'static [&'static str], &'static [&'static str]) =
        match schema_type {
            SchemaType::Article | SchemaType::BlogPosting | SchemaType::NewsArticle => (
                &["headline"],
                &["image", "author", "datePublished", "dateModified", "publisher"],
            ),
            SchemaType::Product => (
                &["name"],
                &["image", "description", "offers", "brand", "sku", "aggregateRating"],
            ),
            SchemaType::Recipe => (
                &["name", "image"],
                &[
                    "description",
                    "author",
                    "recipeIngredient",
                    "recipeInstructions",
                    "totalTime",
                ],
            ),
            SchemaType::HowTo => (&["name", "step"], &["image", "totalTime", "supply", "tool"]),
            SchemaType::FaqPage => (&["mainEntity"], &[]),
            SchemaType::Event => (
                &["name", "startDate", "location"],
                &["description", "image", "endDate", "offers", "organizer", "eventStatus"],
            ),
            SchemaType::Course => (&["name", "description"], &["provider", "offers"]),
            SchemaType::LearningResource => (
                &["name"],
                &["description", "learningResourceType", "timeRequired"],
            ),
            SchemaType::VideoObject => (
                &["name", "thumbnailUrl", "uploadDate"],
                &["description", "duration", "contentUrl", "embedUrl"],
            ),
            SchemaType::Review => (
                &["itemReviewed", "author"],
                &["reviewRating", "datePublished"],
            ),
            SchemaType::LocalBusiness => (
                &["name", "address"],
                &["telephone", "geo", "openingHours", "image", "priceRange", "url"],
            ),
            SchemaType::Organization => (&["name"], &["url", "logo", "sameAs", "contactPoint"]),
            SchemaType::Person => (&["name"], &["url", "image", "jobTitle", "sameAs"]),
            SchemaType::JobPosting => (
                &["title", "description", "datePosted", "hiringOrganization"],
                &["validThrough", "employmentType", "baseSalary"],
            ),
        };
    Rules {
        required,
        recommended,
    }
}

pub fn validate(document: &SchemaDocument) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let type_name = document.schema_type().map(String::from);
    match type_name.as_deref() {
        None => errors.push("missing @type".to_string()),
        Some(name) => match name.parse::<SchemaType>() {
            Ok(schema_type) => {
                let rules = rules_for(schema_type);
                for property in rules.required {
                    if !is_present(document.get(property)) {
                        errors.push(format!("missing required property `{}`", property));
                    }
                }
                for property in rules.recommended {
                    if !is_present(document.get(property)) {
                        warnings.push(format!("missing recommended property `{}`", property));
                    }
                }
                if schema_type == SchemaType::JobPosting {
                    check_job_location(document, &mut errors);
                }
            }
            Err(_) => warnings.push(format!("no property rules for type `{}`", name)),
        },
    }

    for (key, value) in document.properties() {
        check_value(key, value, key, &mut errors);
    }

    ValidationReport {
        schema_type: type_name,
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

fn check_job_location(document: &SchemaDocument, errors: &mut Vec<String>) {
    let remote = document
        .get_str("jobLocationType")
        .is_some_and(|t| t.eq_ignore_ascii_case("TELECOMMUTE"));
    if !remote && !is_present(document.get("jobLocation")) {
        errors.push(
            "missing required property `jobLocation` (or jobLocationType TELECOMMUTE)".into(),
        );
    }
}

/// Shape checks on one property, descending into nested objects and arrays.
fn check_value(key: &str, value: &Value, path: &str, errors: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                check_value(key, item, &format!("{}[{}]", path, i), errors);
            }
            return;
        }
        Value::Object(map) => {
            for (child_key, child) in map {
                check_value(child_key, child, &format!("{}.{}", path, child_key), errors);
            }
            return;
        }
        _ => {}
    }

    if DATE_KEYS.contains(&key) {
        match value.as_str() {
            Some(s) if is_iso_date(s) => {}
            _ => errors.push(format!("`{}` is not an ISO 8601 date: {}", path, value)),
        }
    } else if DURATION_KEYS.contains(&key) {
        match value.as_str() {
            Some(s) if is_iso_duration(s) => {}
            _ => errors.push(format!("`{}` is not an ISO 8601 duration: {}", path, value)),
        }
    } else if let Some(range) = numeric_range(key) {
        match value_as_f64(value) {
            Some(n) if range.contains(&n) => {}
            _ => errors.push(format!("`{}` is out of range: {}", path, value)),
        }
    }
}

fn numeric_range(key: &str) -> Option<std::ops::RangeInclusive<f64>> {
    match key {
        "latitude" => Some(-90.0..=90.0),
        "longitude" => Some(-180.0..=180.0),
        "ratingValue" | "bestRating" | "worstRating" | "price" | "lowPrice" | "highPrice"
        | "reviewCount" | "ratingCount" | "minValue" | "maxValue" => Some(0.0..=f64::MAX),
        _ => None,
    }
}
