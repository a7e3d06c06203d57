//! Value normalization across heterogeneous vendor formats
//!
//! Prices, currencies, availability, ISO 8601 durations and dates arrive in
//! whatever shape the content store or a commerce plugin produced. These
//! helpers coerce them into the canonical schema.org forms, or give up with
//! `None` so the property is omitted.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^P(?:\d+Y)?(?:\d+M)?(?:\d+W)?(?:\d+D)?(?:T(?:\d+H)?(?:\d+M)?(?:\d+(?:\.\d+)?S)?)?$",
    )
    .unwrap()
});

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?$",
    )
    .unwrap()
});

static PERIOD_WITH_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)\s*(days?|d|weeks?|wks?|w|months?|mos?|m|years?|yrs?|y)\b").unwrap()
});

static HOURS_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:hours?|hrs?|h)\b").unwrap()
});

static MINUTES_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:minutes?|mins?|m)\b").unwrap()
});

static CLOCK_DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3}):([0-5]\d)(?::([0-5]\d))?$").unwrap());

pub fn is_iso_duration(s: &str) -> bool {
    let t = s.trim();
    t.len() > 1 && !t.to_ascii_uppercase().ends_with('T') && ISO_DURATION.is_match(t)
}

/// ISO 8601 date or date-time, with a real calendar date.
pub fn is_iso_date(s: &str) -> bool {
    let t = s.trim();
    ISO_DATE.is_match(t)
        && t.get(..10)
            .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok())
            .unwrap_or(false)
}

/// Number, or a string holding a plain number.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Parses a price such as `19.99`, `"€12,99"`, `"1,299.00"` or `"1.234,50 €"`.
pub fn parse_price(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_price_str(s),
        _ => None,
    }?;
    (parsed.is_finite() && parsed >= 0.0).then_some(parsed)
}

fn parse_price_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.starts_with('-') {
        return None;
    }
    let kept: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if !kept.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let last_dot = kept.rfind('.');
    let last_comma = kept.rfind(',');
    let normalized = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => {
            // Whichever separator comes last is the decimal point
            let (decimal, thousands) = if dot > comma { ('.', ',') } else { (',', '.') };
            let without_thousands: String = kept.chars().filter(|c| *c != thousands).collect();
            without_thousands.replace(decimal, ".")
        }
        (None, Some(comma)) => {
            let digits_after = kept.len() - comma - 1;
            let commas = kept.matches(',').count();
            if commas > 1 || digits_after == 3 {
                kept.replace(',', "")
            } else {
                kept.replace(',', ".")
            }
        }
        (Some(_), None) => {
            if kept.matches('.').count() > 1 {
                kept.replace('.', "")
            } else {
                kept
            }
        }
        (None, None) => kept,
    };
    normalized.parse::<f64>().ok()
}

pub fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}

/// ISO 4217 code from a code or a common currency symbol.
pub fn normalize_currency(raw: &str) -> Option<String> {
    let t = raw.trim();
    let code = match t {
        "$" => "USD",
        "€" => "EUR",
        "£" => "GBP",
        "¥" => "JPY",
        "₹" => "INR",
        _ => t,
    };
    (code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| code.to_ascii_uppercase())
}

/// Maps free-text stock states onto schema.org availability URLs.
pub fn normalize_availability(raw: &str) -> String {
    let key: String = raw
        .trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    let key = key
        .strip_prefix("httpsschemaorg")
        .or_else(|| key.strip_prefix("httpschemaorg"))
        .unwrap_or(&key);
    let state = match key {
        "outofstock" | "soldout" | "unavailable" => "OutOfStock",
        "preorder" | "presale" => "PreOrder",
        "backorder" | "onbackorder" => "BackOrder",
        "discontinued" => "Discontinued",
        "limited" | "limitedavailability" | "lowstock" => "LimitedAvailability",
        "instoreonly" => "InStoreOnly",
        "onlineonly" => "OnlineOnly",
        _ => "InStock",
    };
    format!("https://schema.org/{}", state)
}

/// Canonical billing period: ISO 8601 passes through, bare integers are
/// months, and free text like `3 months` or `yearly` is translated.
pub fn normalize_subscription_duration(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            let months = n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f > 0.0)
                    .map(|f| f as u64)
            })?;
            (months > 0).then(|| format!("P{}M", months))
        }
        Value::String(s) => normalize_subscription_text(s),
        _ => None,
    }
}

fn normalize_subscription_text(raw: &str) -> Option<String> {
    let t = raw.trim();
    if t.is_empty() {
        return None;
    }
    if is_iso_duration(t) {
        return Some(t.to_ascii_uppercase());
    }
    if let Ok(months) = t.parse::<u64>() {
        return (months > 0).then(|| format!("P{}M", months));
    }
    if let Some(caps) = PERIOD_WITH_UNIT.captures(t) {
        let amount: u64 = caps[1].parse().ok()?;
        if amount == 0 {
            return None;
        }
        let unit = match caps[2].to_ascii_lowercase().chars().next() {
            Some('d') => 'D',
            Some('w') => 'W',
            Some('y') => 'Y',
            _ => 'M',
        };
        return Some(format!("P{}{}", amount, unit));
    }

    let lower = t.to_ascii_lowercase();
    let period = if lower.contains("quarter") {
        "P3M"
    } else if lower.contains("daily") || lower == "day" {
        "P1D"
    } else if lower.contains("week") {
        "P1W"
    } else if lower.contains("month") {
        "P1M"
    } else if lower.contains("year") || lower.contains("annual") {
        "P1Y"
    } else {
        return None;
    };
    Some(period.to_string())
}

/// `PT{m}M` under an hour, `PT{h}H{m}M` otherwise; zero minutes is no duration.
pub fn minutes_to_iso(minutes: u32) -> Option<String> {
    match minutes {
        0 => None,
        m if m < 60 => Some(format!("PT{}M", m)),
        m => Some(format!("PT{}H{}M", m / 60, m % 60)),
    }
}

pub fn seconds_to_iso(seconds: u32) -> String {
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    let mut out = String::from("PT");
    if h > 0 {
        out.push_str(&format!("{}H", h));
    }
    if m > 0 {
        out.push_str(&format!("{}M", m));
    }
    if s > 0 || (h == 0 && m == 0) {
        out.push_str(&format!("{}S", s));
    }
    out
}

/// Time spans (prep time, total time): ISO passes, integers are minutes,
/// `1 hour 30 minutes`, `1h 30m`, `90 min` and `1:30` are translated.
pub fn normalize_time_duration(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            let minutes = n.as_f64().filter(|f| *f > 0.0)?;
            minutes_to_iso(minutes.round() as u32)
        }
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                return None;
            }
            if is_iso_duration(t) {
                return Some(t.to_ascii_uppercase());
            }
            if let Ok(minutes) = t.parse::<u32>() {
                return minutes_to_iso(minutes);
            }
            if let Some(caps) = CLOCK_DURATION.captures(t) {
                let first: u32 = caps[1].parse().ok()?;
                let second: u32 = caps[2].parse().ok()?;
                return minutes_to_iso(first.checked_mul(60)?.checked_add(second)?);
            }
            let hours = HOURS_PART
                .captures(t)
                .and_then(|c| c[1].parse::<f64>().ok())
                .unwrap_or(0.0);
            let minutes = MINUTES_PART
                .captures(t)
                .and_then(|c| c[1].parse::<u32>().ok())
                .unwrap_or(0);
            let hour_minutes = (hours * 60.0).round();
            if hour_minutes >= f64::from(u32::MAX) {
                return None;
            }
            minutes_to_iso((hour_minutes as u32).checked_add(minutes)?)
        }
        _ => None,
    }
}

/// Accepts RFC 3339 and the common `YYYY-MM-DD[ HH:MM:SS]` shapes.
pub fn normalize_date(raw: &str) -> Option<String> {
    let t = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.to_rfc3339());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string());
        }
    }
    NaiveDate::parse_from_str(t, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

pub fn normalize_employment_type(raw: &str) -> Option<String> {
    let key: String = raw
        .trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    let kind = match key.as_str() {
        "fulltime" | "full" | "permanent" => "FULL_TIME",
        "parttime" | "part" => "PART_TIME",
        "contractor" | "contract" | "freelance" => "CONTRACTOR",
        "temporary" | "temp" | "seasonal" => "TEMPORARY",
        "intern" | "internship" => "INTERN",
        "volunteer" => "VOLUNTEER",
        "perdiem" => "PER_DIEM",
        "" => return None,
        _ => "OTHER",
    };
    Some(kind.to_string())
}

/// Array of strings, or a comma/newline separated string, as a list.
pub fn split_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(['\n', ','])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subscription_duration_forms_agree() {
        for input in [json!("3 months"), json!("P3M"), json!(3), json!("3")] {
            assert_eq!(
                normalize_subscription_duration(&input).as_deref(),
                Some("P3M"),
                "input {input}"
            );
        }
    }

    #[test]
    fn test_subscription_duration_units_and_keywords() {
        assert_eq!(normalize_subscription_duration(&json!("1 year")).as_deref(), Some("P1Y"));
        assert_eq!(normalize_subscription_duration(&json!("2 weeks")).as_deref(), Some("P2W"));
        assert_eq!(normalize_subscription_duration(&json!("14 days")).as_deref(), Some("P14D"));
        assert_eq!(normalize_subscription_duration(&json!("Yearly")).as_deref(), Some("P1Y"));
        assert_eq!(normalize_subscription_duration(&json!("quarterly")).as_deref(), Some("P3M"));
        assert_eq!(normalize_subscription_duration(&json!("p1y")).as_deref(), Some("P1Y"));
        assert_eq!(normalize_subscription_duration(&json!("forever")), None);
        assert_eq!(normalize_subscription_duration(&json!(0)), None);
    }

    #[test]
    fn test_parse_price_formats() {
        assert_eq!(parse_price(&json!(19.99)), Some(19.99));
        assert_eq!(parse_price(&json!("€12,99")), Some(12.99));
        assert_eq!(parse_price(&json!("$1,299.00")), Some(1299.0));
        assert_eq!(parse_price(&json!("1.234,50 €")), Some(1234.5));
        assert_eq!(parse_price(&json!("1,000")), Some(1000.0));
        assert_eq!(parse_price(&json!("free")), None);
        assert_eq!(parse_price(&json!("-5")), None);
        assert_eq!(format_price(20.0), "20.00");
    }

    #[test]
    fn test_currency() {
        assert_eq!(normalize_currency("eur").as_deref(), Some("EUR"));
        assert_eq!(normalize_currency("£").as_deref(), Some("GBP"));
        assert_eq!(normalize_currency("Euro"), None);
    }

    #[test]
    fn test_availability() {
        assert_eq!(normalize_availability("outofstock"), "https://schema.org/OutOfStock");
        assert_eq!(normalize_availability("In stock"), "https://schema.org/InStock");
        assert_eq!(normalize_availability("Pre-order"), "https://schema.org/PreOrder");
        assert_eq!(
            normalize_availability("https://schema.org/BackOrder"),
            "https://schema.org/BackOrder"
        );
        assert_eq!(normalize_availability("whatever"), "https://schema.org/InStock");
    }

    #[test]
    fn test_minutes_and_seconds_to_iso() {
        assert_eq!(minutes_to_iso(0), None);
        assert_eq!(minutes_to_iso(45).as_deref(), Some("PT45M"));
        assert_eq!(minutes_to_iso(90).as_deref(), Some("PT1H30M"));
        assert_eq!(seconds_to_iso(3725), "PT1H2M5S");
        assert_eq!(seconds_to_iso(600), "PT10M");
        assert_eq!(seconds_to_iso(0), "PT0S");
    }

    #[test]
    fn test_time_duration_forms() {
        assert_eq!(
            normalize_time_duration(&json!("1 hour 30 minutes")).as_deref(),
            Some("PT1H30M")
        );
        assert_eq!(normalize_time_duration(&json!("1h 30m")).as_deref(), Some("PT1H30M"));
        assert_eq!(normalize_time_duration(&json!("90 min")).as_deref(), Some("PT1H30M"));
        assert_eq!(normalize_time_duration(&json!("1:30")).as_deref(), Some("PT1H30M"));
        assert_eq!(normalize_time_duration(&json!(20)).as_deref(), Some("PT20M"));
        assert_eq!(normalize_time_duration(&json!("pt15m")).as_deref(), Some("PT15M"));
        assert_eq!(normalize_time_duration(&json!("soon")), None);
    }

    #[test]
    fn test_time_duration_out_of_range_is_dropped() {
        assert_eq!(
            normalize_time_duration(&json!("1 hour 4294967295 minutes")),
            None
        );
        assert_eq!(normalize_time_duration(&json!("99999999999 hours")), None);
    }

    #[test]
    fn test_iso_shapes() {
        assert!(is_iso_duration("PT1H30M"));
        assert!(is_iso_duration("P3M"));
        assert!(!is_iso_duration("P"));
        assert!(!is_iso_duration("PT"));
        assert!(!is_iso_duration("3 months"));
        assert!(is_iso_date("2024-02-29"));
        assert!(is_iso_date("2024-03-01T10:00:00+02:00"));
        assert!(!is_iso_date("2023-02-30"));
        assert!(!is_iso_date("March 3, 2024"));
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2024-03-01").as_deref(), Some("2024-03-01"));
        assert_eq!(
            normalize_date("2024-03-01 09:30:00").as_deref(),
            Some("2024-03-01T09:30:00")
        );
        assert_eq!(
            normalize_date("2024-03-01T09:30:00Z").as_deref(),
            Some("2024-03-01T09:30:00+00:00")
        );
        assert_eq!(normalize_date("yesterday"), None);
    }

    #[test]
    fn test_employment_type() {
        assert_eq!(normalize_employment_type("Full-time").as_deref(), Some("FULL_TIME"));
        assert_eq!(normalize_employment_type("internship").as_deref(), Some("INTERN"));
        assert_eq!(normalize_employment_type("gig").as_deref(), Some("OTHER"));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(&json!("flour, sugar\neggs")), vec!["flour", "sugar", "eggs"]);
        assert_eq!(split_list(&json!(["a", "", 2])), vec!["a", "2"]);
    }
}
