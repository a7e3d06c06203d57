//! Recipe

use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

use super::{BuildContext, SchemaBuilder};
use crate::extractors::extract_steps;
use crate::html;
use crate::normalize::normalize_time_duration;
use crate::schema::SchemaDocument;

static INGREDIENTS_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ingredient|zutaten|ingrédients|ingredientes").unwrap());

const TIME_PROPERTIES: &[&str] = &["prepTime", "cookTime", "totalTime"];

pub struct RecipeBuilder;

impl SchemaBuilder for RecipeBuilder {
    fn handled_properties(&self) -> &'static [&'static str] {
        &[
            "image",
            "author",
            "authorUrl",
            "recipeIngredient",
            "recipeInstructions",
            "prepTime",
            "cookTime",
            "totalTime",
            "recipeCategory",
            "keywords",
            "calories",
            "ratingValue",
            "reviewCount",
        ]
    }

    fn enrich(&self, ctx: &BuildContext<'_>, document: &mut SchemaDocument) {
        document.set_missing("image", ctx.image());
        document.set_missing("author", ctx.author());

        let mut ingredients = ctx.list("recipeIngredient");
        if ingredients.is_empty() {
            ingredients = ingredients_from_body(&ctx.item.body);
        }
        document.set("recipeIngredient", ingredients);
        document.set("recipeInstructions", instructions(ctx));

        for property in TIME_PROPERTIES {
            document.set_missing(
                property,
                ctx.value(property)
                    .and_then(|v| normalize_time_duration(&v))
                    .map(Into::into),
            );
        }

        document.set_missing(
            "recipeCategory",
            ctx.text("recipeCategory")
                .or_else(|| ctx.primary_term("category"))
                .map(Into::into),
        );
        document.set_missing("keywords", ctx.text("keywords").map(Into::into));

        if let Some(calories) = ctx.text("calories") {
            let calories = if calories.chars().all(|c| c.is_ascii_digit() || c == '.') {
                format!("{} calories", calories)
            } else {
                calories
            };
            document.set(
                "nutrition",
                json!({"@type": "NutritionInformation", "calories": calories}),
            );
        }

        document.set_missing("aggregateRating", ctx.aggregate_rating());

        if let Some(embed) = ctx.video() {
            let name = document.get_str("name").unwrap_or_default().to_string();
            document.set(
                "video",
                json!({
                    "@type": "VideoObject",
                    "name": name,
                    "contentUrl": embed.content_url(),
                    "embedUrl": embed.embed_url(),
                    "thumbnailUrl": embed.thumbnail_url(),
                }),
            );
        }
    }
}

/// Mapped instructions one step per entry, else steps found in the body.
fn instructions(ctx: &BuildContext<'_>) -> Vec<Value> {
    let mapped = ctx.list("recipeInstructions");
    if !mapped.is_empty() {
        return mapped
            .into_iter()
            .enumerate()
            .map(|(i, text)| json!({"@type": "HowToStep", "position": i + 1, "text": text}))
            .collect();
    }
    extract_steps(&ctx.item.body)
        .into_iter()
        .map(|step| {
            json!({
                "@type": "HowToStep",
                "position": step.position,
                "name": step.name,
                "text": step.text,
            })
        })
        .collect()
}

/// Lines of the section under an "Ingredients" heading.
fn ingredients_from_body(markup: &str) -> Vec<String> {
    let document = html::parse(markup);
    html::headings(&document, &[1, 2, 3, 4, 5, 6])
        .into_iter()
        .find(|h| INGREDIENTS_HEADING.is_match(&html::element_text(*h)))
        .map(html::section_lines)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::fixture::{item, Fixture};
    use crate::content::FieldMapping;
    use crate::schema::SchemaType;
    use pretty_assertions::assert_eq;

    const BODY: &str = "<h2>Ingredients</h2><ul><li>2 eggs</li><li>100 g flour</li></ul>\
                        <h2>Method</h2><ol><li>Whisk the eggs</li><li>Fold in flour</li></ol>";

    #[test]
    fn test_ingredients_and_steps_from_body() {
        let doc = Fixture::new(item(BODY)).build(SchemaType::Recipe);
        assert_eq!(doc.get("recipeIngredient"), Some(&json!(["2 eggs", "100 g flour"])));
        assert_eq!(
            doc.get("recipeInstructions"),
            Some(&json!([
                {"@type": "HowToStep", "position": 1, "name": "Step 1", "text": "Whisk the eggs"},
                {"@type": "HowToStep", "position": 2, "name": "Step 2", "text": "Fold in flour"}
            ]))
        );
    }

    #[test]
    fn test_mapped_times_and_nutrition() {
        let fx = Fixture::new(item(BODY)).with_mapping(
            FieldMapping::new()
                .map("prepTime", "custom:text:15 min")
                .map("cookTime", "custom:number:90")
                .map("totalTime", "custom:text:PT1H45M")
                .map("calories", "custom:number:320")
                .map("recipeIngredient", "custom:text:salt, pepper"),
        );
        let doc = fx.build(SchemaType::Recipe);
        assert_eq!(doc.get_str("prepTime"), Some("PT15M"));
        assert_eq!(doc.get_str("cookTime"), Some("PT1H30M"));
        assert_eq!(doc.get_str("totalTime"), Some("PT1H45M"));
        assert_eq!(doc.get("nutrition").unwrap()["calories"], json!("320 calories"));
        assert_eq!(doc.get("recipeIngredient"), Some(&json!(["salt", "pepper"])));
    }

    #[test]
    fn test_embedded_video() {
        let body = format!(
            r#"{}<iframe src="https://www.youtube.com/embed/dQw4w9WgXcQ"></iframe>"#,
            BODY
        );
        let doc = Fixture::new(item(&body)).build(SchemaType::Recipe);
        let video = doc.get("video").unwrap();
        assert_eq!(video["name"], json!("Hello & welcome"));
        assert_eq!(video["embedUrl"], json!("https://www.youtube.com/embed/dQw4w9WgXcQ"));
    }
}
