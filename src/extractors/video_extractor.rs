//! Embedded video detection (YouTube, Vimeo)

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::html;

static YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:youtube(?:-nocookie)?\.com/(?:watch\?(?:[^\s"'<>]*&)?v=|embed/|shorts/|live/|v/)|youtu\.be/)([A-Za-z0-9_-]{11})"#,
    )
    .unwrap()
});

static VIMEO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:player\.)?vimeo\.com/(?:video/|channels/[\w-]+/)?(\d+)").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoEmbed {
    /// Platform tag passed to the video metadata provider
    pub platform: &'static str,
    pub id: String,
}

impl VideoEmbed {
    pub fn content_url(&self) -> String {
        match self.platform {
            "youtube" => format!("https://www.youtube.com/watch?v={}", self.id),
            _ => format!("https://vimeo.com/{}", self.id),
        }
    }

    pub fn embed_url(&self) -> String {
        match self.platform {
            "youtube" => format!("https://www.youtube.com/embed/{}", self.id),
            _ => format!("https://player.vimeo.com/video/{}", self.id),
        }
    }

    pub fn thumbnail_url(&self) -> Option<String> {
        match self.platform {
            "youtube" => Some(format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", self.id)),
            _ => None,
        }
    }

    /// Deep link into the video at `seconds`.
    pub fn url_at(&self, seconds: u32) -> String {
        match self.platform {
            "youtube" => format!("https://www.youtube.com/watch?v={}&t={}", self.id, seconds),
            _ => format!("https://vimeo.com/{}#t={}s", self.id, seconds),
        }
    }
}

pub fn parse_video_url(candidate: &str) -> Option<VideoEmbed> {
    if let Some(caps) = YOUTUBE.captures(candidate) {
        return Some(VideoEmbed {
            platform: "youtube",
            id: caps[1].to_string(),
        });
    }
    VIMEO.captures(candidate).map(|caps| VideoEmbed {
        platform: "vimeo",
        id: caps[1].to_string(),
    })
}

/// First YouTube or Vimeo video referenced by the markup: embeds and links
/// first, then bare URLs in the text.
pub fn detect_video(markup: &str) -> Option<VideoEmbed> {
    let document = html::parse(markup);

    if let Some(sel) = html::selector("iframe[src], embed[src], video[src], source[src], a[href]") {
        let found = document
            .select(&sel)
            .filter_map(|el| el.value().attr("src").or_else(|| el.value().attr("href")))
            .find_map(parse_video_url);
        if found.is_some() {
            return found;
        }
    }

    html::element_lines(document.root_element())
        .iter()
        .find_map(|line| parse_video_url(line))
}
