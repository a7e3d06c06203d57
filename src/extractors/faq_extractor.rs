//! Question/answer pairs from heading + paragraph patterns

use scraper::ElementRef;
use serde::Serialize;

use crate::html;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaqPair {
    pub question: String,
    pub answer: String,
}

/// Every heading directly followed by a paragraph becomes a question; the
/// paragraphs up to the next heading form its answer.
pub fn extract_faq(markup: &str) -> Vec<FaqPair> {
    let document = html::parse(markup);

    html::headings(&document, &[1, 2, 3, 4, 5, 6])
        .into_iter()
        .filter_map(|heading| {
            let question = html::element_text(heading);
            if question.is_empty() {
                return None;
            }
            let answer = answer_paragraphs(heading).join(" ");
            (!answer.is_empty()).then_some(FaqPair { question, answer })
        })
        .collect()
}

fn answer_paragraphs(heading: ElementRef<'_>) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut first = true;

    for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
        if html::heading_level(&sibling).is_some() {
            break;
        }
        if sibling.value().name() == "p" {
            let text = html::element_text(sibling);
            if !text.is_empty() {
                paragraphs.push(text);
            }
        } else if first {
            // Only headings immediately followed by a paragraph qualify
            break;
        }
        first = false;
    }

    paragraphs
}
