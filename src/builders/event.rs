//! Event

use serde_json::{json, Value};

use super::{BuildContext, SchemaBuilder};
use crate::normalize::parse_price;
use crate::resolver::looks_like_url;
use crate::schema::SchemaDocument;

const HANDLED: &[&str] = &[
    "image",
    "startDate",
    "endDate",
    "eventStatus",
    "eventAttendanceMode",
    "location",
    "locationUrl",
    "organizer",
    "organizerUrl",
    "performer",
    "price",
    "priceCurrency",
    "availability",
    "validFrom",
    "streetAddress",
    "addressLocality",
    "addressRegion",
    "postalCode",
    "addressCountry",
];

pub struct EventBuilder;

impl SchemaBuilder for EventBuilder {
    fn handled_properties(&self) -> &'static [&'static str] {
        HANDLED
    }

    fn enrich(&self, ctx: &BuildContext<'_>, document: &mut SchemaDocument) {
        document.set_missing("image", ctx.image());
        document.set_missing("startDate", ctx.date("startDate").map(Into::into));
        document.set_missing("endDate", ctx.date("endDate").map(Into::into));

        let status = ctx
            .text("eventStatus")
            .map(|s| event_status(&s))
            .unwrap_or("EventScheduled");
        document.set("eventStatus", format!("https://schema.org/{}", status));

        let physical = physical_location(ctx);
        let virtual_location = ctx
            .text("locationUrl")
            .filter(|u| looks_like_url(u))
            .map(|url| json!({"@type": "VirtualLocation", "url": url}));

        let mode = ctx
            .text("eventAttendanceMode")
            .and_then(|m| attendance_mode(&m))
            .unwrap_or(match (&physical, &virtual_location) {
                (Some(_), Some(_)) => "MixedEventAttendanceMode",
                (None, Some(_)) => "OnlineEventAttendanceMode",
                _ => "OfflineEventAttendanceMode",
            });
        document.set("eventAttendanceMode", format!("https://schema.org/{}", mode));

        let mut locations: Vec<Value> = physical.into_iter().chain(virtual_location).collect();
        match locations.len() {
            0 => {}
            1 => document.set("location", locations.remove(0)),
            _ => document.set("location", locations),
        }

        let organizer = ctx
            .text("organizer")
            .map(|name| {
                json!({
                    "@type": "Organization",
                    "name": name,
                    "url": ctx.text("organizerUrl"),
                })
            })
            .or_else(|| ctx.publisher());
        document.set_missing("organizer", organizer);

        let performers: Vec<Value> = ctx
            .list("performer")
            .into_iter()
            .map(|name| json!({"@type": "PerformingGroup", "name": name}))
            .collect();
        document.set("performer", performers);

        if let Some(price) = ctx.value("price").and_then(|v| parse_price(&v)) {
            let mut offer = ctx.offer(price);
            if let Some(from) = ctx.date("validFrom") {
                offer.insert("validFrom".into(), json!(from));
            }
            document.set("offers", Value::Object(offer));
        }
    }
}

fn physical_location(ctx: &BuildContext<'_>) -> Option<Value> {
    let name = ctx.text("location");
    let address = ctx.postal_address();
    if name.is_none() && address.is_none() {
        return None;
    }
    Some(json!({
        "@type": "Place",
        "name": name,
        "address": address,
    }))
}

fn event_status(raw: &str) -> &'static str {
    let key = raw.to_ascii_lowercase();
    if key.contains("cancel") {
        "EventCancelled"
    } else if key.contains("postpone") {
        "EventPostponed"
    } else if key.contains("reschedul") {
        "EventRescheduled"
    } else if key.contains("online") || key.contains("moved") {
        "EventMovedOnline"
    } else {
        "EventScheduled"
    }
}

fn attendance_mode(raw: &str) -> Option<&'static str> {
    let key = raw.to_ascii_lowercase();
    if key.contains("mixed") || key.contains("hybrid") {
        Some("MixedEventAttendanceMode")
    } else if key.contains("online") || key.contains("virtual") {
        Some("OnlineEventAttendanceMode")
    } else if key.contains("offline") || key.contains("person") {
        Some("OfflineEventAttendanceMode")
    } else {
        None
    }
}
