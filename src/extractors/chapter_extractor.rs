//! Video chapters
//!
//! Sources are tried in priority order, the first one that produces chapters
//! wins:
//! 1. an explicit structured field (array of objects, or a JSON string of one)
//! 2. dedicated meta fields
//! 3. a content section under a chapter-marker heading, or a container whose
//!    class mentions `chapter`
//! 4. timestamp lines anywhere in the content
//!
//! Output is sorted by start offset with duplicates removed. End offsets are
//! derived afterwards: each chapter ends where the next one starts, and the
//! last one ends at the total duration when that is known.

use regex::Regex;
use scraper::Html;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;

use crate::html;

/// Meta keys that may hold chapter data.
pub const CHAPTER_META_KEYS: &[&str] = &["video_chapters", "_video_chapters", "chapters"];

static HMS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\[(]?(\d{1,2}):([0-5]\d):([0-5]\d)[\])]?\s*(?:[-–—|:]\s*)?(.*)$").unwrap()
});

static MS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\[(]?(\d{1,3}):([0-5]\d)[\])]?\s*(?:[-–—|:]\s*)?(.*)$").unwrap()
});

static SECONDS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\[(]?(\d+)s?[\])]?\s*(?:[-–—|:]\s*)?(\D.*)$").unwrap()
});

static MARKER_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:video\s+)?(?:chapters?|timestamps?|key\s+moments|table\s+of\s+contents|kapitel|zeitstempel|chapitres|capítulos|capitulos|capitoli|hoofdstukken|rozdziały)\s*:?\s*$",
    )
    .unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    pub name: String,
    pub start_offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<u32>,
    /// 1-based
    pub position: usize,
}

/// Inputs for chapter extraction, in priority order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChapterSources<'a> {
    pub structured: Option<&'a Value>,
    pub meta: Option<&'a Value>,
    pub body: &'a str,
}

/// Extract chapters from the given sources; `total_duration` is in seconds.
pub fn extract_chapters(sources: &ChapterSources<'_>, total_duration: Option<u32>) -> Vec<Chapter> {
    let mut raw = sources.structured.map(chapters_from_value).unwrap_or_default();

    if raw.is_empty() {
        raw = sources.meta.map(chapters_from_value).unwrap_or_default();
    }

    if raw.is_empty() && !sources.body.trim().is_empty() {
        let document = html::parse(sources.body);
        raw = chapters_from_marked_sections(&document);
        if raw.is_empty() {
            raw = chapters_from_free_text(&document);
        }
    }

    finalize(raw, total_duration)
}

/// `HH:MM:SS`, `MM:SS` or a bare number of seconds.
pub fn parse_timestamp(raw: &str) -> Option<u32> {
    let parts: Vec<&str> = raw.trim().trim_end_matches('s').split(':').collect();
    let nums: Vec<u32> = parts
        .iter()
        .map(|p| p.trim().parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;
    match nums.as_slice() {
        [h, m, s] if *m < 60 && *s < 60 => h.checked_mul(3600)?.checked_add(m * 60 + s),
        [m, s] if *s < 60 => m.checked_mul(60)?.checked_add(*s),
        [s] => Some(*s),
        _ => None,
    }
}

/// One `timestamp [separator] title` line. Bare-seconds timestamps are only
/// accepted when `allow_bare_seconds` is set.
pub fn parse_chapter_line(line: &str, allow_bare_seconds: bool) -> Option<(String, u32)> {
    let line = line.trim();

    let (offset, title) = if let Some(caps) = HMS_LINE.captures(line) {
        let h: u32 = caps[1].parse().ok()?;
        let m: u32 = caps[2].parse().ok()?;
        let s: u32 = caps[3].parse().ok()?;
        (h * 3600 + m * 60 + s, caps[4].to_string())
    } else if let Some(caps) = MS_LINE.captures(line) {
        let m: u32 = caps[1].parse().ok()?;
        let s: u32 = caps[2].parse().ok()?;
        (m * 60 + s, caps[3].to_string())
    } else if allow_bare_seconds {
        let caps = SECONDS_LINE.captures(line)?;
        (caps[1].parse().ok()?, caps[2].to_string())
    } else {
        return None;
    };

    let title = title.trim().trim_matches(|c| matches!(c, '-' | '–' | '—' | '|' | ':')).trim();
    (!title.is_empty()).then(|| (title.to_string(), offset))
}

fn chapters_from_value(value: &Value) -> Vec<(String, u32)> {
    match value {
        Value::Array(items) => items.iter().filter_map(chapter_from_item).collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.starts_with('[') {
                if let Ok(parsed @ Value::Array(_)) = serde_json::from_str::<Value>(trimmed) {
                    return chapters_from_value(&parsed);
                }
            }
            html::text_lines(trimmed)
                .iter()
                .filter_map(|line| parse_chapter_line(line, true))
                .collect()
        }
        _ => vec![],
    }
}

fn chapter_from_item(item: &Value) -> Option<(String, u32)> {
    match item {
        Value::Object(obj) => {
            let name = ["name", "title", "label"]
                .iter()
                .filter_map(|k| obj.get(*k).and_then(|v| v.as_str()))
                .map(html::collapse_whitespace)
                .find(|s| !s.is_empty())?;
            let start = ["startOffset", "start", "time", "timestamp", "seconds"]
                .iter()
                .filter_map(|k| obj.get(*k))
                .find_map(offset_from_value)?;
            Some((name, start))
        }
        Value::String(line) => parse_chapter_line(line, true),
        _ => None,
    }
}

fn offset_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.floor() as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => parse_timestamp(s),
        _ => None,
    }
}

fn chapters_from_marked_sections(document: &Html) -> Vec<(String, u32)> {
    for heading in html::headings(document, &[1, 2, 3, 4, 5, 6]) {
        if !MARKER_HEADING.is_match(&html::element_text(heading)) {
            continue;
        }
        let found: Vec<(String, u32)> = html::section_lines(heading)
            .iter()
            .filter_map(|line| parse_chapter_line(line, true))
            .collect();
        if !found.is_empty() {
            return found;
        }
    }

    let Some(sel) = html::selector(r#"[class*="chapter"], [class*="Chapter"]"#) else {
        return vec![];
    };
    for container in document.select(&sel) {
        let found: Vec<(String, u32)> = html::element_lines(container)
            .iter()
            .filter_map(|line| parse_chapter_line(line, true))
            .collect();
        if !found.is_empty() {
            return found;
        }
    }

    vec![]
}

fn chapters_from_free_text(document: &Html) -> Vec<(String, u32)> {
    let found: Vec<(String, u32)> = html::element_lines(document.root_element())
        .iter()
        .filter_map(|line| parse_chapter_line(line, false))
        .collect();
    // A single stray timestamp is not a chapter list
    if found.len() >= 2 {
        found
    } else {
        vec![]
    }
}

fn finalize(mut raw: Vec<(String, u32)>, total_duration: Option<u32>) -> Vec<Chapter> {
    raw.sort_by_key(|(_, start)| *start);
    raw.dedup_by_key(|(_, start)| *start);
    if let Some(total) = total_duration {
        raw.retain(|(_, start)| *start < total);
    }

    let mut chapters: Vec<Chapter> = raw
        .into_iter()
        .enumerate()
        .map(|(i, (name, start_offset))| Chapter {
            name,
            start_offset,
            end_offset: None,
            position: i + 1,
        })
        .collect();
    compute_end_offsets(&mut chapters, total_duration);
    chapters
}

/// Each chapter ends where the next begins; the last ends at `total_duration`.
pub fn compute_end_offsets(chapters: &mut [Chapter], total_duration: Option<u32>) {
    let starts: Vec<u32> = chapters.iter().map(|c| c.start_offset).collect();
    for (i, chapter) in chapters.iter_mut().enumerate() {
        chapter.end_offset = starts.get(i + 1).copied().or(total_duration);
    }
}
