//! Reading and viewing time estimation

use serde::Serialize;

use crate::html;
use crate::normalize;

pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// Minutes needed to read `words` at `words_per_minute`, rounded up.
pub fn reading_minutes(words: usize, words_per_minute: u32) -> u32 {
    let wpm = words_per_minute.max(1) as usize;
    u32::try_from(words.div_ceil(wpm)).unwrap_or(u32::MAX)
}

/// Whole minutes of video, rounded up.
pub fn video_minutes(seconds: u32) -> u32 {
    seconds.div_ceil(60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeEstimate {
    pub reading_minutes: u32,
    pub video_minutes: u32,
    pub total_minutes: u32,
}

impl TimeEstimate {
    /// Estimate for a content body plus an optional known video length.
    pub fn for_body(markup: &str, video_seconds: Option<u32>, words_per_minute: u32) -> Self {
        let reading = reading_minutes(html::word_count(markup), words_per_minute);
        let video = video_seconds.map(video_minutes).unwrap_or(0);
        TimeEstimate {
            reading_minutes: reading,
            video_minutes: video,
            total_minutes: reading.saturating_add(video),
        }
    }

    /// Applies a caller adjustment to the total.
    pub fn adjusted(self, adjust: impl FnOnce(u32) -> u32) -> Self {
        TimeEstimate {
            total_minutes: adjust(self.total_minutes),
            ..self
        }
    }

    /// ISO 8601 duration of the total, `None` for zero minutes.
    pub fn to_iso(&self) -> Option<String> {
        normalize::minutes_to_iso(self.total_minutes)
    }
}
