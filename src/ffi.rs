//! FFI interface for C/C++ hosts
//!
//! Provides C-compatible functions for generating and checking JSON-LD.
//! Everything crosses the boundary as JSON. Collaborator data that would
//! normally come from live providers (field sources, video durations, the
//! types another emitter outputs) is passed in the request as snapshots.

use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::ffi::{c_char, CStr, CString};
use std::ptr;

use crate::config::EngineConfig;
use crate::content::{ContentItem, FieldMapping, SourceTag};
use crate::engine::SchemaEngine;
use crate::error::{Result, SchemaError};
use crate::extractors::detect_emitted_types;
use crate::providers::{StaticEmittedTypes, StaticFieldSource, StaticVideoDurations};
use crate::schema::SchemaDocument;
use crate::validator::validate;

/// Result struct returned to the host.
/// Both pointers are owned by Rust and must be freed via free_schema_result
#[repr(C)]
pub struct SchemaResultFFI {
    /// JSON-serialized result (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message if the call failed (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

/// One generation request.
#[derive(Debug, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub config: EngineConfig,
    pub item: ContentItem,
    #[serde(default)]
    pub mapping: FieldMapping,
    /// Source tag -> field key -> value. Values under `native` are added to
    /// the item's meta fields unless already present there.
    #[serde(default)]
    pub field_values: HashMap<String, HashMap<String, Value>>,
    /// `platform:video_id` -> duration in seconds
    #[serde(default)]
    pub video_durations: HashMap<String, u32>,
    /// Types another emitter already outputs for this item
    #[serde(default)]
    pub external_types: Vec<String>,
}

/// Generate JSON-LD for one content item.
///
/// # Arguments
/// * `request_json` - JSON-serialized GenerationRequest (null-terminated)
///
/// # Returns
/// SchemaResultFFI whose JSON is `{"jsonld": ..., "reports": [...]}`, or
/// error_ptr set when the request could not be read
///
/// # Safety
/// - `request_json` must be a valid null-terminated C string
/// - Caller must free the result via `free_schema_result`
#[no_mangle]
pub unsafe extern "C" fn generate_jsonld_ffi(request_json: *const c_char) -> SchemaResultFFI {
    let request = match read_c_str(request_json, "Request JSON") {
        Ok(s) => s,
        Err(e) => return make_error_result(&e.to_string()),
    };
    make_result(generate_from_request(request))
}

/// Validate a JSON-LD document, or every entry of an `@graph`.
///
/// # Safety
/// Same as generate_jsonld_ffi
#[no_mangle]
pub unsafe extern "C" fn validate_jsonld_ffi(document_json: *const c_char) -> SchemaResultFFI {
    let document = match read_c_str(document_json, "Document JSON") {
        Ok(s) => s,
        Err(e) => return make_error_result(&e.to_string()),
    };
    make_result(validate_json(document))
}

/// Schema types already declared in rendered HTML (JSON-LD and microdata).
///
/// # Safety
/// - `html_ptr` must point to valid memory of at least `html_len` bytes
/// - Caller must free the result via `free_schema_result`
#[no_mangle]
pub unsafe extern "C" fn detect_types_ffi(
    html_ptr: *const c_char,
    html_len: usize,
) -> SchemaResultFFI {
    let html = if html_ptr.is_null() || html_len == 0 {
        String::new()
    } else {
        let slice = std::slice::from_raw_parts(html_ptr as *const u8, html_len);
        match std::str::from_utf8(slice) {
            Ok(s) => s.to_string(),
            Err(_) => return make_error_result("Invalid UTF-8 in HTML"),
        }
    };
    make_result(Ok(json!(detect_emitted_types(&html))))
}

/// Free a SchemaResultFFI returned by any function in this module
///
/// # Safety
/// - `result` must have been returned by one of the `*_ffi` functions
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_schema_result(result: SchemaResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `warn`).
/// Returns false when a subscriber was already installed.
#[no_mangle]
pub extern "C" fn init_tracing_ffi() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "schema_markup=warn".into()),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

unsafe fn read_c_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(SchemaError::Request(format!("{} is null", what)));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| SchemaError::Request(format!("Invalid UTF-8 in {}", what)))
}

fn make_result(result: Result<Value>) -> SchemaResultFFI {
    match result {
        Ok(value) => match CString::new(value.to_string()) {
            Ok(cstr) => SchemaResultFFI {
                json_ptr: cstr.into_raw(),
                error_ptr: ptr::null_mut(),
            },
            Err(_) => make_error_result("Result JSON contains null bytes"),
        },
        Err(e) => make_error_result(&e.to_string()),
    }
}

// Helper to create error result
fn make_error_result(msg: &str) -> SchemaResultFFI {
    let error_cstr = CString::new(msg.replace('\0', " ")).unwrap_or_default();
    SchemaResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr: error_cstr.into_raw(),
    }
}

/// Runs one request through a freshly wired engine.
pub fn generate_from_request(request_json: &str) -> Result<Value> {
    let request: GenerationRequest = serde_json::from_str(request_json)?;
    request.config.validate()?;

    let GenerationRequest {
        config,
        mut item,
        mapping,
        field_values,
        video_durations,
        external_types,
    } = request;

    let mut builder = SchemaEngine::builder(config)
        .video_metadata(StaticVideoDurations(video_durations))
        .emitted_type_detector(StaticEmittedTypes(external_types));
    for (tag, values) in field_values {
        if SourceTag::new(&tag) == SourceTag::native() {
            for (key, value) in values {
                item.meta.entry(key).or_insert(value);
            }
        } else {
            builder = builder.field_source(&tag, StaticFieldSource(values));
        }
    }
    let engine = builder.build();

    let generation = engine.generate(&item, &mapping);
    Ok(json!({
        "jsonld": generation.to_json_ld(),
        "reports": generation.reports,
        "rejected": generation.rejected,
    }))
}

/// Reports for a single document, or one per `@graph` entry.
pub fn validate_json(document_json: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(document_json)?;
    let as_document = |v: &Value| match v {
        Value::Object(map) => Ok(SchemaDocument::from_map(map.clone())),
        _ => Err(SchemaError::Request("document must be a JSON object".into())),
    };

    if let Some(graph) = value.get("@graph").and_then(|g| g.as_array()) {
        let reports = graph
            .iter()
            .map(|entry| as_document(entry).map(|doc| validate(&doc)))
            .collect::<Result<Vec<_>>>()?;
        return Ok(serde_json::to_value(reports)?);
    }
    let mut document = as_document(&value)?;
    document.remove("@context");
    Ok(serde_json::to_value(validate(&document))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REQUEST: &str = r#"{
        "config": {
            "content_types": {"product": "Product"},
            "default_currency": "EUR",
            "organization": {"name": "Acme"}
        },
        "item": {
            "id": 5,
            "content_type": "product",
            "url": "https://shop.test/widget/",
            "title": "Widget",
            "body": "<p>A very good widget.</p>"
        },
        "mapping": {
            "fields": {"sku": "sku_code", "price": "_price", "brand": "custom:text:Acme"},
            "sources": {"sku_code": "pim"}
        },
        "field_values": {
            "pim": {"sku_code": "W-1"},
            "native": {"_price": "19,90"}
        },
        "external_types": ["Product"]
    }"#;

    fn c_string(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    unsafe fn take_json(result: SchemaResultFFI) -> Value {
        assert!(result.error_ptr.is_null());
        let json: Value =
            serde_json::from_str(CStr::from_ptr(result.json_ptr).to_str().unwrap()).unwrap();
        free_schema_result(result);
        json
    }

    #[test]
    fn test_generate_request() {
        let mut request: Value = serde_json::from_str(REQUEST).unwrap();
        request["external_types"] = json!([]);
        let out = generate_from_request(&request.to_string()).unwrap();
        let jsonld = &out["jsonld"];
        assert_eq!(jsonld["@context"], json!("https://schema.org"));
        assert_eq!(jsonld["@type"], json!("Product"));
        assert_eq!(jsonld["sku"], json!("W-1"));
        assert_eq!(jsonld["brand"], json!({"@type": "Brand", "name": "Acme"}));
        assert_eq!(jsonld["offers"]["price"], json!("19.90"));
        assert_eq!(jsonld["offers"]["priceCurrency"], json!("EUR"));
        assert_eq!(out["reports"][0]["valid"], json!(true));
    }

    #[test]
    fn test_source_tags_match_regardless_of_case() {
        let mut request: Value = serde_json::from_str(REQUEST).unwrap();
        request["external_types"] = json!([]);
        request["mapping"]["sources"] = json!({"sku_code": "PIM"});
        request["field_values"] = json!({
            " Pim ": {"sku_code": "W-1"},
            "NATIVE": {"_price": "19,90"}
        });
        let out = generate_from_request(&request.to_string()).unwrap();
        assert_eq!(out["jsonld"]["sku"], json!("W-1"));
        assert_eq!(out["jsonld"]["offers"]["price"], json!("19.90"));
    }

    #[test]
    fn test_external_types_suppress_duplicates() {
        let out = generate_from_request(REQUEST).unwrap();
        assert_eq!(out["jsonld"], Value::Null);
        assert_eq!(out["reports"], json!([]));
    }

    #[test]
    fn test_bad_requests() {
        assert!(matches!(
            generate_from_request("{\"config\": {}}"),
            Err(SchemaError::Json(_))
        ));
        let bad_config =
            r#"{"config": {"words_per_minute": 0}, "item": {"id": 1, "content_type": "post"}}"#;
        assert!(matches!(
            generate_from_request(bad_config),
            Err(SchemaError::Config(_))
        ));
    }

    #[test]
    fn test_ffi_roundtrip() {
        unsafe {
            let request = c_string(REQUEST);
            let out = take_json(generate_jsonld_ffi(request.as_ptr()));
            assert!(out.get("jsonld").is_some());

            let result = generate_jsonld_ffi(ptr::null());
            assert!(result.json_ptr.is_null());
            assert_eq!(
                CStr::from_ptr(result.error_ptr).to_str().unwrap(),
                "Invalid request: Request JSON is null"
            );
            free_schema_result(result);
        }
    }

    #[test]
    fn test_validate_graph() {
        let doc = c_string(
            r#"{"@context": "https://schema.org", "@graph": [
                {"@type": "Article", "headline": "Hi"},
                {"@type": "Event", "name": "Meetup"}
            ]}"#,
        );
        let reports = unsafe { take_json(validate_jsonld_ffi(doc.as_ptr())) };
        assert_eq!(reports[0]["valid"], json!(true));
        assert_eq!(reports[1]["valid"], json!(false));

        let single = validate_json(
            r#"{"@context": "https://schema.org", "@type": "Person", "name": "Sam"}"#,
        )
        .unwrap();
        assert_eq!(single["type"], json!("Person"));
        assert_eq!(single["valid"], json!(true));
    }

    #[test]
    fn test_detect_types() {
        let html = r#"<script type="application/ld+json">{"@graph": [{"@type": "WebPage"}, {"@type": "Article"}]}</script>"#;
        let out =
            unsafe { take_json(detect_types_ffi(html.as_ptr() as *const c_char, html.len())) };
        assert_eq!(out, json!(["WebPage", "Article"]));
    }
}
