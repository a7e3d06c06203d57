//! learningResourceType / interactivityType classification
//!
//! A fixed decision table evaluated top to bottom against signals measured
//! on the content; the first matching rule wins and `Lesson` is the fallback.

use regex::Regex;
use scraper::Html;
use serde::Serialize;
use std::sync::LazyLock;

use super::duration_extractor::{reading_minutes, video_minutes};
use super::step_extractor::is_numbered_heading;
use crate::html;

static QUIZ_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bquiz(?:zes)?\b|\bquestion\s+\d+\b").unwrap());

const MIN_CODE_BLOCKS: usize = 3;
const MIN_STEPS: usize = 3;
/// At least one step per this many words
const WORDS_PER_STEP: usize = 150;
const LONG_READ_WORDS: usize = 2000;
const SHORT_READ_WORDS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResourceKind {
    Quiz,
    Video,
    Tutorial,
    Guide,
    Reading,
    Overview,
    Lesson,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Quiz => "Quiz",
            ResourceKind::Video => "Video",
            ResourceKind::Tutorial => "Tutorial",
            ResourceKind::Guide => "Guide",
            ResourceKind::Reading => "Reading",
            ResourceKind::Overview => "Overview",
            ResourceKind::Lesson => "Lesson",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Interactivity {
    Active,
    Expositive,
    Mixed,
}

impl Interactivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Interactivity::Active => "active",
            Interactivity::Expositive => "expositive",
            Interactivity::Mixed => "mixed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub resource_kind: ResourceKind,
    pub interactivity: Interactivity,
}

const fn class(resource_kind: ResourceKind, interactivity: Interactivity) -> Classification {
    Classification {
        resource_kind,
        interactivity,
    }
}

/// Measurements the rule table runs against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSignals {
    pub has_quiz_markers: bool,
    pub word_count: usize,
    pub reading_minutes: u32,
    pub video_minutes: u32,
    pub code_blocks: usize,
    pub numbered_steps: usize,
}

impl ContentSignals {
    pub fn measure(markup: &str, video_seconds: Option<u32>, words_per_minute: u32) -> Self {
        let document = html::parse(markup);
        let word_count = html::word_count(markup);

        ContentSignals {
            has_quiz_markers: has_quiz_markers(&document),
            word_count,
            reading_minutes: reading_minutes(word_count, words_per_minute),
            video_minutes: video_seconds.map(video_minutes).unwrap_or(0),
            code_blocks: code_blocks(&document),
            numbered_steps: numbered_steps(&document),
        }
    }
}

type Rule = (fn(&ContentSignals) -> bool, Classification);

const RULES: &[Rule] = &[
    (
        |s: &ContentSignals| s.has_quiz_markers,
        class(ResourceKind::Quiz, Interactivity::Active),
    ),
    (
        |s: &ContentSignals| s.video_minutes > 0 && s.video_minutes >= s.reading_minutes,
        class(ResourceKind::Video, Interactivity::Expositive),
    ),
    (
        |s: &ContentSignals| s.code_blocks >= MIN_CODE_BLOCKS,
        class(ResourceKind::Tutorial, Interactivity::Mixed),
    ),
    (
        |s: &ContentSignals| {
            s.numbered_steps >= MIN_STEPS && s.numbered_steps * WORDS_PER_STEP >= s.word_count
        },
        class(ResourceKind::Guide, Interactivity::Active),
    ),
    (
        |s: &ContentSignals| s.word_count >= LONG_READ_WORDS,
        class(ResourceKind::Reading, Interactivity::Expositive),
    ),
    (
        |s: &ContentSignals| s.word_count < SHORT_READ_WORDS,
        class(ResourceKind::Overview, Interactivity::Expositive),
    ),
];

const FALLBACK: Classification = class(ResourceKind::Lesson, Interactivity::Expositive);

pub fn classify(signals: &ContentSignals) -> Classification {
    RULES
        .iter()
        .find(|(applies, _)| applies(signals))
        .map(|(_, classification)| *classification)
        .unwrap_or(FALLBACK)
}

pub fn classify_content(
    markup: &str,
    video_seconds: Option<u32>,
    words_per_minute: u32,
) -> Classification {
    classify(&ContentSignals::measure(markup, video_seconds, words_per_minute))
}

fn has_quiz_markers(document: &Html) -> bool {
    if let Some(sel) = html::selector("form, input, textarea, select") {
        if document.select(&sel).next().is_some() {
            return true;
        }
    }
    if let Some(sel) = html::selector("[class]") {
        if document.select(&sel).any(|el| html::has_class_containing(&el, "quiz")) {
            return true;
        }
    }
    QUIZ_TEXT.is_match(&html::element_text(document.root_element()))
}

/// `pre` blocks plus `code` elements that are not inside a `pre`.
fn code_blocks(document: &Html) -> usize {
    let Some(sel) = html::selector("pre, code") else {
        return 0;
    };
    document
        .select(&sel)
        .filter(|el| {
            el.value().name() == "pre"
                || !el
                    .ancestors()
                    .filter_map(|n| n.value().as_element())
                    .any(|a| a.name() == "pre")
        })
        .count()
}

/// Items of ordered lists plus numbered headings.
fn numbered_steps(document: &Html) -> usize {
    let list_items = html::selector("ol > li")
        .map(|sel| document.select(&sel).count())
        .unwrap_or(0);
    let headings = html::headings(document, &[1, 2, 3, 4, 5, 6])
        .into_iter()
        .filter(|h| is_numbered_heading(&html::element_text(*h)))
        .count();
    list_items + headings
}
