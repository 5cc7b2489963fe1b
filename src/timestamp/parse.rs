use crate::WatchError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Date-time layouts carrying an explicit offset
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y/%m/%d %H:%M:%S%.f %z",
];

/// Date-time layouts without an offset; these are taken to be UTC
///
/// Month-first slash dates come before day-first ones, so `07/08/2016` is
/// July 8th and only an impossible month falls through to day-first.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S%.f",
    "%B %d, %Y %H:%M:%S%.f",
    "%b %d, %Y %H:%M:%S%.f",
    "%B %d %Y %H:%M:%S%.f",
    "%b %d %Y %H:%M:%S%.f",
    "%d %B %Y %H:%M:%S%.f",
    "%d %b %Y %H:%M:%S%.f",
    "%a %b %e %H:%M:%S%.f %Y",
    "%Y%m%d_%H%M%S",
    "%Y%m%dT%H%M%S",
];

/// Date-only layouts; these resolve to midnight UTC
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

/// Zone designators that mean "already UTC"
const UTC_DESIGNATORS: &[&str] = &["UTC", "GMT", "Z"];

static GENERATED_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Generated: (.+?) UTC").expect("generated-marker pattern is valid")
});

/// Parses a human-written timestamp into a UTC instant
///
/// Accepts RFC 3339, RFC 2822 and a broad family of year-first, month-first and
/// day-first notations, with or without fractional seconds. Text carrying an
/// explicit offset is converted to UTC; text without one is taken as UTC.
///
/// # Errors
///
/// Returns `WatchError::MalformedTimestamp` when no known layout matches.
///
/// # Example
///
/// ```
/// use state_watch::timestamp::parse_instant;
///
/// let instant = parse_instant("2016-07-20 20:34:36.844030").unwrap();
/// assert_eq!(instant.timestamp(), 1469046876);
/// ```
pub fn parse_instant(text: &str) -> Result<DateTime<Utc>, WatchError> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let parsed = parse_with_offset(&normalized)
        .or_else(|| parse_naive(strip_utc_designator(&normalized)));

    match parsed {
        Some(instant) => {
            tracing::trace!("Parsed timestamp {} out of '{}'", instant, text);
            Ok(instant)
        }
        None => {
            tracing::error!("Could not parse timestamp out of '{}'", text);
            Err(WatchError::MalformedTimestamp {
                text: text.to_string(),
            })
        }
    }
}

/// Finds the "Generated: <text> UTC" stamp in page content and parses it
///
/// The stamp is an unannounced convention of the watched site; there is no
/// fallback when it disappears.
///
/// # Errors
///
/// * `WatchError::MissingTimestampMarker` - No stamp in the content
/// * `WatchError::MalformedTimestamp` - The stamp text does not parse
pub fn extract_generated_instant(content: &str) -> Result<DateTime<Utc>, WatchError> {
    let captured = GENERATED_MARKER
        .captures(content)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| {
            tracing::error!("Could not find a generated timestamp in page content");
            WatchError::MissingTimestampMarker
        })?;

    tracing::debug!("Possible timestamp: {}", captured.as_str());
    parse_instant(captured.as_str())
}

fn parse_with_offset(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }

    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_naive(text: &str) -> Option<DateTime<Utc>> {
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    Some(Utc.from_utc_datetime(&naive))
}

fn strip_utc_designator(text: &str) -> &str {
    for designator in UTC_DESIGNATORS {
        if let Some(stripped) = text.strip_suffix(designator) {
            return stripped.trim_end();
        }
    }
    text
}
