//! Markup helpers shared by the resolver, extractors and builders
//!
//! Everything goes through `scraper`, so entities are decoded by the HTML
//! parser. Block-level elements become line breaks in extracted text, which
//! keeps `<p>a</p><p>b</p>` from collapsing into `ab`.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table", "tbody", "td",
    "tfoot", "th", "thead", "tr", "ul",
];

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

pub fn parse(markup: &str) -> Html {
    Html::parse_fragment(markup)
}

pub fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Heading level for `h1`..`h6`.
pub fn heading_level(element: &ElementRef<'_>) -> Option<u8> {
    match element.value().name() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

pub fn has_class_containing(element: &ElementRef<'_>, needle: &str) -> bool {
    element
        .value()
        .attr("class")
        .map(|c| c.to_ascii_lowercase().contains(needle))
        .unwrap_or(false)
}

fn render_children(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    let block = BLOCK_ELEMENTS.contains(&name);
                    if block {
                        out.push('\n');
                    }
                    render_children(child_el, out);
                    if block {
                        out.push('\n');
                    }
                }
            }
            _ => {}
        }
    }
}

fn raw_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    render_children(element, &mut out);
    out
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn split_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Text of an element: tags stripped, entities decoded, whitespace collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&raw_text(element))
}

/// Text of an element split at block boundaries and `<br>`.
pub fn element_lines(element: ElementRef<'_>) -> Vec<String> {
    split_lines(&raw_text(element))
}

pub fn strip_tags(markup: &str) -> String {
    let document = parse(markup);
    element_text(document.root_element())
}

pub fn text_lines(markup: &str) -> Vec<String> {
    let document = parse(markup);
    element_lines(document.root_element())
}

pub fn word_count(markup: &str) -> usize {
    strip_tags(markup).split_whitespace().count()
}

/// Raw text of the siblings that follow `heading`, up to the next heading.
fn section_raw(heading: ElementRef<'_>) -> String {
    let mut out = String::new();
    for sibling in heading.next_siblings() {
        match sibling.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let Some(sibling_el) = ElementRef::wrap(sibling) else {
                    continue;
                };
                if heading_level(&sibling_el).is_some() {
                    break;
                }
                if SKIPPED_ELEMENTS.contains(&el.name()) {
                    continue;
                }
                if el.name() == "br" {
                    out.push('\n');
                    continue;
                }
                out.push('\n');
                render_children(sibling_el, &mut out);
                out.push('\n');
            }
            _ => {}
        }
    }
    out
}

/// Content between a heading and the next heading, as collapsed text.
pub fn section_text(heading: ElementRef<'_>) -> String {
    collapse_whitespace(&section_raw(heading))
}

/// Content between a heading and the next heading, as lines.
pub fn section_lines(heading: ElementRef<'_>) -> Vec<String> {
    split_lines(&section_raw(heading))
}

/// Headings of the given levels in document order.
pub fn headings<'a>(document: &'a Html, levels: &[u8]) -> Vec<ElementRef<'a>> {
    let Some(sel) = selector("h1, h2, h3, h4, h5, h6") else {
        return vec![];
    };
    document
        .select(&sel)
        .filter(|el| heading_level(el).map(|l| levels.contains(&l)).unwrap_or(false))
        .collect()
}

/// `src` of the first image in the markup.
pub fn first_image(markup: &str) -> Option<String> {
    let document = parse(markup);
    let sel = selector("img[src]")?;
    document
        .select(&sel)
        .filter_map(|el| el.value().attr("src"))
        .map(str::trim)
        .find(|src| !src.is_empty())
        .map(String::from)
}

/// Shortens `text` to at most `max_chars`, cutting at a word boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(pos) if pos > 0 => cut[..pos].trim_end().to_string(),
        _ => cut,
    }
}
