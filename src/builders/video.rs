//! VideoObject
//!
//! Chapters become `Clip` parts. They are read from the mapped `chapters`
//! field, the dedicated meta fields, or the body, in that order.

use serde_json::{json, Value};

use super::{BuildContext, SchemaBuilder};
use crate::extractors::{extract_chapters, ChapterSources, VideoEmbed, CHAPTER_META_KEYS};
use crate::normalize::{normalize_time_duration, seconds_to_iso};
use crate::schema::SchemaDocument;

pub struct VideoBuilder;

impl SchemaBuilder for VideoBuilder {
    fn handled_properties(&self) -> &'static [&'static str] {
        &[
            "thumbnailUrl",
            "uploadDate",
            "duration",
            "contentUrl",
            "embedUrl",
            "video",
            "chapters",
        ]
    }

    fn enrich(&self, ctx: &BuildContext<'_>, document: &mut SchemaDocument) {
        let embed = ctx.video();
        let seconds = embed.as_ref().and_then(|e| ctx.video_seconds(e));

        let thumbnail = ctx
            .text("thumbnailUrl")
            .or_else(|| embed.as_ref().and_then(VideoEmbed::thumbnail_url))
            .or_else(|| ctx.image_url());
        document.set_missing("thumbnailUrl", thumbnail.map(Into::into));

        let upload_date = ctx
            .date("uploadDate")
            .or_else(|| ctx.item.published.map(|d| d.to_rfc3339()));
        document.set_missing("uploadDate", upload_date.map(Into::into));

        let duration = seconds.map(seconds_to_iso).or_else(|| {
            ctx.value("duration")
                .and_then(|v| normalize_time_duration(&v))
        });
        document.set_missing("duration", duration.map(Into::into));

        if let Some(embed) = &embed {
            document.set_missing("contentUrl", Some(embed.content_url().into()));
            document.set_missing("embedUrl", Some(embed.embed_url().into()));
        }

        let structured = ctx.raw("chapters");
        let meta = CHAPTER_META_KEYS
            .iter()
            .find_map(|key| ctx.item.meta.get(*key));
        let sources = ChapterSources {
            structured: structured.as_ref(),
            meta,
            body: &ctx.item.body,
        };
        let clips: Vec<Value> = extract_chapters(&sources, seconds)
            .into_iter()
            .map(|chapter| {
                json!({
                    "@type": "Clip",
                    "name": chapter.name,
                    "startOffset": chapter.start_offset,
                    "endOffset": chapter.end_offset,
                    "url": embed.as_ref().map(|e| e.url_at(chapter.start_offset)),
                })
            })
            .collect();
        document.set("hasPart", clips);
    }
}
