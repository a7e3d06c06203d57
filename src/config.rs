//! Engine configuration
//!
//! A fully resolved value passed into the engine. Nothing in the crate reads
//! settings from anywhere else.
//!
//! ```toml
//! default_currency = "EUR"
//! words_per_minute = 220
//! emit_invalid = false
//!
//! [content_types]
//! post = "BlogPosting"
//! product = "Product"
//!
//! [additional_types]
//! product = ["Review"]
//!
//! [auto_detect]
//! faq = true
//!
//! [organization]
//! name = "Acme"
//! url = "https://acme.test"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::content::ImageRef;
use crate::error::{Result, SchemaError};
use crate::extractors::DEFAULT_WORDS_PER_MINUTE;
use crate::providers::OrganizationInfo;
use crate::schema::SchemaType;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Content-derived types emitted on top of the configured ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoDetect {
    /// Emit `FAQPage` when the body has question/answer pairs
    pub faq: bool,
    /// Emit `VideoObject` when the body embeds a video
    pub video: bool,
}

impl Default for AutoDetect {
    fn default() -> Self {
        Self {
            faq: true,
            video: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Content type tag -> primary schema type
    pub content_types: BTreeMap<String, SchemaType>,
    /// Content type tag -> extra schema types
    pub additional_types: BTreeMap<String, Vec<SchemaType>>,
    pub disabled_types: Vec<SchemaType>,
    pub auto_detect: AutoDetect,
    pub default_currency: String,
    pub words_per_minute: u32,
    /// Skip types another emitter already outputs
    pub avoid_duplicates: bool,
    /// Keep documents that fail validation
    pub emit_invalid: bool,
    pub organization: Option<OrganizationInfo>,
    pub fallback_image: Option<ImageRef>,
    pub language: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            content_types: BTreeMap::new(),
            additional_types: BTreeMap::new(),
            disabled_types: Vec::new(),
            auto_detect: AutoDetect::default(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            avoid_duplicates: true,
            emit_invalid: true,
            organization: None,
            fallback_image: None,
            language: None,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        let currency = self.default_currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SchemaError::Config(format!(
                "default_currency must be a 3-letter code, got `{}`",
                self.default_currency
            )));
        }
        if self.words_per_minute == 0 {
            return Err(SchemaError::Config(
                "words_per_minute must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Currency code in canonical upper case.
    pub fn currency(&self) -> String {
        self.default_currency.trim().to_ascii_uppercase()
    }

    pub fn is_enabled(&self, schema_type: SchemaType) -> bool {
        !self.disabled_types.contains(&schema_type)
    }

    /// Configured types for a content type: the primary one, then the
    /// additional ones, without repeats or disabled types.
    pub fn types_for(&self, content_type: &str) -> Vec<SchemaType> {
        let mut types = Vec::new();
        let configured = self
            .content_types
            .get(content_type)
            .into_iter()
            .chain(self.additional_types.get(content_type).into_iter().flatten());
        for &schema_type in configured {
            if self.is_enabled(schema_type) && !types.contains(&schema_type) {
                types.push(schema_type);
            }
        }
        types
    }
}
