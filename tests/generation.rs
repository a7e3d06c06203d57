//! End-to-end generation through the public engine API.

use pretty_assertions::assert_eq;
use schema_markup::providers::{OrganizationInfo, StaticVideoDurations, VideoMetadata};
use schema_markup::{
    CollaboratorError, ContentItem, EngineConfig, FieldMapping, SchemaEngine, SchemaType,
};
use serde_json::{json, Value};
use std::collections::HashMap;

const CONFIG: &str = r#"
default_currency = "EUR"

[content_types]
recipe = "Recipe"
lesson = "LearningResource"

[additional_types]
recipe = ["HowTo"]

[auto_detect]
faq = false

[organization]
name = "Kitchen Co"
url = "https://kitchen.test"
logo = "https://kitchen.test/logo.png"
"#;

const RECIPE_BODY: &str = r#"
<p><img src="/img/soup.jpg" alt="Soup"></p>
<h2>Ingredients</h2>
<ul><li>2 carrots</li><li>1 onion</li><li>1 l water</li></ul>
<h2>Instructions</h2>
<ol><li>Chop the vegetables.</li><li>Boil for 20 minutes.</li><li>Blend.</li></ol>
<h3>Can I freeze it?</h3><p>Yes, for a month.</p>
"#;

fn recipe_item() -> ContentItem {
    let mut item = ContentItem::new(100, "recipe");
    item.url = "https://kitchen.test/soup/".into();
    item.title = "Carrot &amp; onion soup".into();
    item.body = RECIPE_BODY.into();
    item.published = "2024-02-10T12:00:00+01:00".parse().ok();
    item
}

#[test]
fn test_recipe_with_additional_howto() {
    let config = EngineConfig::from_toml_str(CONFIG).unwrap();
    let engine = SchemaEngine::builder(config).build();
    let mapping = FieldMapping::new()
        .map("prepTime", "custom:text:15 min")
        .map("cookTime", "custom:number:20");

    let generation = engine.generate(&recipe_item(), &mapping);
    let types: Vec<&str> = generation
        .documents
        .iter()
        .filter_map(|d| d.schema_type())
        .collect();
    assert_eq!(types, vec!["Recipe", "HowTo"]);

    let recipe = &generation.documents[0];
    assert_eq!(recipe.get_str("name"), Some("Carrot & onion soup"));
    assert_eq!(recipe.get_str("prepTime"), Some("PT15M"));
    assert_eq!(recipe.get_str("cookTime"), Some("PT20M"));
    assert_eq!(
        recipe.get("recipeIngredient"),
        Some(&json!(["2 carrots", "1 onion", "1 l water"]))
    );
    assert_eq!(
        recipe.get("image").unwrap()["url"],
        json!("https://kitchen.test/img/soup.jpg")
    );
    assert!(generation.reports[0].valid, "{:?}", generation.reports[0]);

    let howto = &generation.documents[1];
    let steps = howto.get("step").unwrap().as_array().unwrap();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[1]["text"], json!("Boil for 20 minutes."));
    assert_eq!(steps[1]["position"], json!(2));

    let json_ld = generation.to_json_ld().unwrap();
    assert_eq!(json_ld["@context"], json!("https://schema.org"));
    assert_eq!(json_ld["@graph"][1]["@type"], json!("HowTo"));
    assert!(json_ld["@graph"][0].get("@context").is_none());
}

#[test]
fn test_learning_resource_with_failing_video_provider() {
    let config = EngineConfig::from_toml_str(CONFIG).unwrap();
    let failing = |_: &str, _: &str| -> Result<Option<VideoMetadata>, CollaboratorError> {
        Err(CollaboratorError::new("video metadata", "quota exceeded"))
    };
    let engine = SchemaEngine::builder(config.clone()).video_metadata(failing).build();

    let mut item = ContentItem::new(7, "lesson");
    item.url = "https://school.test/lesson-1/".into();
    item.title = "Lesson 1".into();
    item.body = format!(
        "<p>{}</p><iframe src=\"https://youtu.be/dQw4w9WgXcQ\"></iframe>",
        vec!["word"; 450].join(" ")
    );

    let generation = engine.generate(&item, &FieldMapping::new());
    let lesson = &generation.documents[0];
    assert_eq!(lesson.get_str("@type"), Some("LearningResource"));
    assert_eq!(lesson.get_str("timeRequired"), Some("PT3M"));
    assert_eq!(lesson.get_str("learningResourceType"), Some("Lesson"));

    let video = &generation.documents[1];
    assert_eq!(video.get_str("@type"), Some("VideoObject"));
    assert!(!video.contains("duration"));

    let mut durations = HashMap::new();
    durations.insert("youtube:dQw4w9WgXcQ".to_string(), 1800);
    let engine = SchemaEngine::builder(config)
        .video_metadata(StaticVideoDurations(durations))
        .organization(OrganizationInfo {
            name: "School".into(),
            url: None,
            logo: None,
        })
        .build();
    let generation = engine.generate(&item, &FieldMapping::new());
    let lesson = &generation.documents[0];
    assert_eq!(lesson.get_str("timeRequired"), Some("PT33M"));
    assert_eq!(lesson.get_str("learningResourceType"), Some("Video"));
    assert_eq!(lesson.get("publisher").unwrap()["name"], json!("School"));
    assert_eq!(generation.documents[1].get_str("duration"), Some("PT30M"));
}

#[test]
fn test_unmapped_content_type_yields_nothing() {
    let engine = SchemaEngine::builder(EngineConfig::default()).build();
    let item = ContentItem::new(1, "attachment");
    let generation = engine.generate(&item, &FieldMapping::new());
    assert!(generation.is_empty());
    assert_eq!(generation.to_json_ld(), None::<Value>);
}

#[test]
fn test_single_type_is_not_wrapped_in_graph() {
    let mut config = EngineConfig::default();
    config
        .content_types
        .insert("recipe".into(), SchemaType::Recipe);
    config.auto_detect.faq = false;
    let engine = SchemaEngine::builder(config).build();
    let json_ld = engine
        .generate(&recipe_item(), &FieldMapping::new())
        .to_json_ld()
        .unwrap();
    assert_eq!(json_ld["@type"], json!("Recipe"));
    assert!(json_ld.get("@graph").is_none());
}
