//! Schema types already present as microdata
//!
//! Reference: https://html.spec.whatwg.org/multipage/microdata.html

use scraper::{Html, Selector};

use super::jsonld_extractor::push_type;

/// `itemtype` names of top-level `itemscope` items, in document order.
///
/// Nested items (an `offers` Offer inside a Product) are properties of their
/// parent and are not reported.
pub fn microdata_types(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("[itemscope]") {
        Ok(s) => s,
        Err(_) => return vec![],
    };

    let mut types = Vec::new();

    for element in document.select(&selector) {
        let is_nested = element
            .ancestors()
            .filter_map(|n| n.value().as_element())
            .any(|el| el.attr("itemscope").is_some());

        if is_nested {
            continue;
        }

        // itemtype may list several space-separated type URLs
        if let Some(itemtype) = element.value().attr("itemtype") {
            for url in itemtype.split_whitespace() {
                push_type(&mut types, url);
            }
        }
    }

    types
}
