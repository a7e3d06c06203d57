//! Step sequences from content markup
//!
//! Three strategies, tried in order; the first that yields anything wins:
//! 1. items of the first ordered list
//! 2. numbered headings (`Step 1`, `#2`, `3.`, localized step words)
//! 3. a run of plain `h2`/`h3`/`h4` headings at the level of the first one

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html};
use serde::Serialize;
use std::sync::LazyLock;

use crate::html;

static NUMBERED_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:step|schritt|étape|etape|etapa|paso|passo|stap|krok|шаг)\s*\d+|#\s*\d+|\d+\s*[.):])",
    )
    .unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub name: String,
    pub text: String,
    /// 1-based
    pub position: usize,
}

pub(crate) fn is_numbered_heading(text: &str) -> bool {
    NUMBERED_HEADING.is_match(text)
}

/// Extract ordered steps from content markup.
pub fn extract_steps(markup: &str) -> Vec<Step> {
    let document = html::parse(markup);

    let steps = steps_from_ordered_list(&document);
    if !steps.is_empty() {
        return steps;
    }

    let steps = steps_from_numbered_headings(&document);
    if !steps.is_empty() {
        return steps;
    }

    steps_from_heading_run(&document)
}

fn steps_from_ordered_list(document: &Html) -> Vec<Step> {
    let Some(sel) = html::selector("ol") else {
        return vec![];
    };

    for list in document.select(&sel) {
        let steps: Vec<Step> = list
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "li")
            .filter_map(|li| {
                let text = html::element_text(li);
                (!text.is_empty()).then(|| (leading_bold(li), text))
            })
            .enumerate()
            .map(|(i, (name, text))| Step {
                name: name.unwrap_or_else(|| format!("Step {}", i + 1)),
                text,
                position: i + 1,
            })
            .collect();

        if !steps.is_empty() {
            return steps;
        }
    }

    vec![]
}

/// Text of a `<strong>`/`<b>` that opens a list item, if any.
fn leading_bold(item: ElementRef<'_>) -> Option<String> {
    for child in item.children() {
        match child.value() {
            Node::Text(text) if text.trim().is_empty() => continue,
            Node::Element(el) if matches!(el.name(), "strong" | "b") => {
                let text = ElementRef::wrap(child).map(html::element_text)?;
                return (!text.is_empty()).then_some(text);
            }
            _ => return None,
        }
    }
    None
}

fn steps_from_numbered_headings(document: &Html) -> Vec<Step> {
    let headings: Vec<ElementRef<'_>> = html::headings(document, &[1, 2, 3, 4, 5, 6])
        .into_iter()
        .filter(|h| is_numbered_heading(&html::element_text(*h)))
        .collect();
    heading_steps(headings)
}

fn steps_from_heading_run(document: &Html) -> Vec<Step> {
    let candidates = html::headings(document, &[2, 3, 4]);
    let Some(level) = candidates.first().and_then(html::heading_level) else {
        return vec![];
    };
    let run = candidates
        .into_iter()
        .filter(|h| html::heading_level(h) == Some(level))
        .collect();
    heading_steps(run)
}

fn heading_steps(headings: Vec<ElementRef<'_>>) -> Vec<Step> {
    headings
        .into_iter()
        .filter_map(|heading| {
            let name = html::element_text(heading);
            if name.is_empty() {
                return None;
            }
            let text = html::section_text(heading);
            let text = if text.is_empty() { name.clone() } else { text };
            Some((name, text))
        })
        .enumerate()
        .map(|(i, (name, text))| Step {
            name,
            text,
            position: i + 1,
        })
        .collect()
}
