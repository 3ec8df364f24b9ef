//! Date handling shared by all sources.
//!
//! One explicit timezone discipline: every datetime handed downstream is
//! Europe/Berlin. Naive inputs are interpreted as Berlin civil time, offset
//! inputs are converted.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

pub const BERLIN: Tz = chrono_tz::Europe::Berlin;

static GERMAN_NUMERIC_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\.(\d{1,2})\.(\d{4})?").unwrap());

static MONTH_NAMES: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    HashMap::from([
        // German
        ("januar", 1),
        ("februar", 2),
        ("märz", 3),
        ("maerz", 3),
        ("april", 4),
        ("mai", 5),
        ("juni", 6),
        ("juli", 7),
        ("august", 8),
        ("september", 9),
        ("oktober", 10),
        ("november", 11),
        ("dezember", 12),
        // English
        ("january", 1),
        ("february", 2),
        ("march", 3),
        ("may", 5),
        ("june", 6),
        ("july", 7),
        ("october", 10),
        ("december", 12),
    ])
});

pub fn now_berlin() -> DateTime<Tz> {
    Utc::now().with_timezone(&BERLIN)
}

/// Build a Berlin datetime from civil components. Returns `None` for
/// nonexistent local times (DST gap) or invalid dates.
pub fn berlin_datetime(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<DateTime<Tz>> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let naive = date.and_hms_opt(hour, minute, 0)?;
    from_naive(naive)
}

/// Interpret a naive datetime as Berlin civil time.
pub fn from_naive(naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    BERLIN.from_local_datetime(&naive).earliest()
}

/// Parse an ISO 8601 datetime into Berlin time.
///
/// Accepts offset-aware strings ("2026-01-23T20:00:00+01:00",
/// "2025-10-15T17:00:00.000Z") and naive strings ("2026-01-23T20:00:00"),
/// which are assumed to already be Berlin civil time.
pub fn parse_iso_datetime(value: &str) -> Option<DateTime<Tz>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&BERLIN));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return from_naive(naive);
        }
    }
    None
}

/// Parse a bare ISO date ("2026-01-23").
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parse a German numeric date ("21.11.2025" or "21.11." with future-aware
/// year) out of arbitrary surrounding text, e.g. "Donnerstag, 21.11.2025".
pub fn parse_german_date(text: &str) -> Option<NaiveDate> {
    let captures = GERMAN_NUMERIC_DATE_RE.captures(text)?;
    let day: u32 = captures.get(1)?.as_str().parse().ok()?;
    let month: u32 = captures.get(2)?.as_str().parse().ok()?;
    match captures.get(3) {
        Some(year) => {
            let year: i32 = year.as_str().parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        }
        None => future_date(day, month),
    }
}

/// Resolve a day/month pair to a date with a future-aware year: dates more
/// than a day in the past roll over to next year.
pub fn future_date(day: u32, month: u32) -> Option<NaiveDate> {
    let today = now_berlin().date_naive();
    let candidate = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if candidate < today - Duration::days(1) {
        NaiveDate::from_ymd_opt(today.year() + 1, month, day)
    } else {
        Some(candidate)
    }
}

/// Look up a German or English month name (case-insensitive).
pub fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES.get(name.trim().to_lowercase().as_str()).copied()
}
