//! Content extraction modules
//!
//! Each module derives one kind of structured data from content markup.
//! Extractors are pure: unparsable or unstructured input yields an empty
//! result, never an error.

mod chapter_extractor;
mod classifier;
mod duration_extractor;
mod faq_extractor;
mod jsonld_extractor;
mod microdata_extractor;
mod step_extractor;
mod video_extractor;

pub use chapter_extractor::*;
pub use classifier::*;
pub use duration_extractor::*;
pub use faq_extractor::*;
pub use jsonld_extractor::jsonld_types;
pub use microdata_extractor::*;
pub use step_extractor::{extract_steps, Step};
pub use video_extractor::*;

/// Schema types a rendered page already declares, JSON-LD first, then
/// microdata, without repeats.
pub fn detect_emitted_types(html: &str) -> Vec<String> {
    let mut types = jsonld_types(html);
    for name in microdata_types(html) {
        if !types.contains(&name) {
            types.push(name);
        }
    }
    types
}
