//! schema.org JSON-LD generation for content items
//!
//! Composes structured-data documents from a content snapshot and a field
//! mapping:
//! - Field resolution through pluggable, tag-keyed sources
//! - Content extraction (steps, FAQ pairs, video chapters, reading time)
//! - One builder per supported schema type
//! - Duplicate filtering against another emitter, and structural validation
//!
//! [`SchemaEngine`] runs the whole flow; [`ffi`] exposes it to C hosts.

pub mod builders;
pub mod config;
pub mod content;
pub mod dedupe;
pub mod engine;
pub mod error;
pub mod extractors;
pub mod ffi;
pub mod html;
pub mod normalize;
pub mod providers;
pub mod resolver;
pub mod schema;
pub mod validator;

pub use config::EngineConfig;
pub use content::{Author, ContentItem, FieldKey, FieldMapping, ImageRef, SourceTag, Term};
pub use engine::{Generation, SchemaEngine, SchemaEngineBuilder};
pub use error::{CollaboratorError, Result, SchemaError};
pub use ffi::*;
pub use resolver::{FieldResolver, ResolvedValue, SourceRegistry};
pub use schema::{to_json_ld, SchemaDocument, SchemaType};
pub use validator::{validate, ValidationReport};
