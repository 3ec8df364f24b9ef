//! Kulturpalast Linden source, via the venue's iCalendar feed.
//!
//! The feed (The Events Calendar export) needs line-level care: properties
//! are folded across lines, all-day events carry DATE-only values, and some
//! cross-midnight events have a DTEND before their DTSTART. The parser
//! unfolds, fixes what is fixable and drops what is not.

use crate::config::Config;
use crate::dates::{from_naive, BERLIN};
use crate::error::Result;
use crate::sanitize::sanitize_text;
use crate::sources::{http_client, EventSource, SourceType};
use crate::types::{Event, EventCategory};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;
use tracing::{debug, info};

const ICAL_URL: &str = "https://kulturpalast-hannover.de/events/?ical=1";
const EVENTS_PAGE: &str = "https://kulturpalast-hannover.de/events/";
const VENUE_NAME: &str = "Kulturpalast Linden";
const ADDRESS: &str = "Deisterstraße 24, 30449 Hannover";
const MAX_EVENTS: usize = 60;

pub struct KulturpalastLindenSource {
    client: reqwest::Client,
}

#[derive(Default)]
struct VEvent {
    summary: String,
    dtstart: Option<DateTime<Tz>>,
    dtend: Option<DateTime<Tz>>,
    all_day: bool,
    url: String,
    description: String,
}

impl KulturpalastLindenSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(config.request_timeout())?,
        })
    }

    pub fn parse_calendar(ics_text: &str) -> Vec<Event> {
        let mut events = Vec::new();

        for vevent in Self::vevents(ics_text) {
            match Self::build_event(vevent) {
                Some(event) => events.push(event),
                None => debug!("dropping unparseable VEVENT"),
            }
        }

        events.sort_by_key(|event| event.date());
        events.truncate(MAX_EVENTS);
        events
    }

    /// Split the feed into VEVENT blocks after unfolding continuation lines.
    fn vevents(ics_text: &str) -> Vec<VEvent> {
        let mut unfolded: Vec<String> = Vec::new();
        for line in ics_text.lines() {
            if (line.starts_with(' ') || line.starts_with('\t')) && !unfolded.is_empty() {
                let last = unfolded.last_mut().unwrap();
                last.push_str(line.trim_start());
            } else {
                unfolded.push(line.trim_end().to_string());
            }
        }

        let mut blocks = Vec::new();
        let mut current: Option<VEvent> = None;

        for line in unfolded {
            if line == "BEGIN:VEVENT" {
                current = Some(VEvent::default());
                continue;
            }
            if line == "END:VEVENT" {
                if let Some(vevent) = current.take() {
                    blocks.push(vevent);
                }
                continue;
            }
            let Some(vevent) = current.as_mut() else { continue };

            let Some((prefix, value)) = line.split_once(':') else { continue };
            let (name, params) = match prefix.split_once(';') {
                Some((name, params)) => (name, params),
                None => (prefix, ""),
            };

            match name {
                "SUMMARY" => vevent.summary = unescape_ics(value),
                "URL" => vevent.url = value.trim().to_string(),
                "DESCRIPTION" => vevent.description = unescape_ics(value),
                "DTSTART" => {
                    vevent.all_day = params.contains("VALUE=DATE") || value.len() == 8;
                    vevent.dtstart = parse_ics_datetime(value);
                }
                "DTEND" => vevent.dtend = parse_ics_datetime(value),
                _ => {}
            }
        }

        // A file ending mid-event drops the partial block
        blocks
    }

    fn build_event(vevent: VEvent) -> Option<Event> {
        if vevent.summary.trim().is_empty() {
            return None;
        }
        let mut date = vevent.dtstart?;

        if let Some(dtend) = vevent.dtend {
            if dtend < date && dtend.date_naive() != date.date_naive() {
                // Not a cross-midnight case: the event data is broken
                return None;
            }
        }

        // All-day events default to 20:00 to avoid midnight in the digest
        if vevent.all_day && date.time().format("%H%M").to_string() == "0000" {
            date = from_naive(date.date_naive().and_hms_opt(20, 0, 0)?)?;
        }

        let url = if vevent.url.is_empty() {
            EVENTS_PAGE.to_string()
        } else {
            vevent.url
        };

        let subtitle = vevent
            .description
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(|line| sanitize_text(line, 200))
            .unwrap_or_default();

        let mut metadata = BTreeMap::new();
        metadata.insert("time".to_string(), date.format("%H:%M").to_string());
        metadata.insert("description".to_string(), subtitle);
        metadata.insert("event_type".to_string(), "event".to_string());
        metadata.insert("address".to_string(), ADDRESS.to_string());

        Event::new(vevent.summary, date, VENUE_NAME, url, EventCategory::Radar, metadata).ok()
    }
}

/// Parse an ICS datetime value: `YYYYMMDD`, `YYYYMMDDTHHMMSS` (local) or
/// `YYYYMMDDTHHMMSSZ` (UTC).
fn parse_ics_datetime(value: &str) -> Option<DateTime<Tz>> {
    let value = value.trim();

    if value.len() == 8 && value.chars().all(|c| c.is_ascii_digit()) {
        let date = parse_ics_date(value)?;
        return from_naive(date.and_hms_opt(0, 0, 0)?);
    }

    let (date_part, time_part) = value.split_once('T')?;
    let date = parse_ics_date(date_part)?;
    let is_utc = time_part.ends_with('Z');
    let time_digits = time_part.trim_end_matches('Z');
    if time_digits.len() < 4 {
        return None;
    }
    let hour: u32 = time_digits.get(0..2)?.parse().ok()?;
    let minute: u32 = time_digits.get(2..4)?.parse().ok()?;
    let second: u32 = time_digits.get(4..6).and_then(|s| s.parse().ok()).unwrap_or(0);

    let naive = date.and_hms_opt(hour, minute, second)?;
    if is_utc {
        Some(Utc.from_utc_datetime(&naive).with_timezone(&BERLIN))
    } else {
        from_naive(naive)
    }
}

fn parse_ics_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 {
        return None;
    }
    let year: i32 = value.get(0..4)?.parse().ok()?;
    let month: u32 = value.get(4..6)?.parse().ok()?;
    let day: u32 = value.get(6..8)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn unescape_ics(value: &str) -> String {
    value
        .replace("\\n", "\n")
        .replace("\\N", "\n")
        .replace("\\,", ",")
        .replace("\\;", ";")
        .replace("\\\\", "\\")
        .trim()
        .to_string()
}

#[async_trait]
impl EventSource for KulturpalastLindenSource {
    fn source_id(&self) -> &'static str {
        "kulturpalast_linden"
    }

    fn venue_name(&self) -> &'static str {
        VENUE_NAME
    }

    fn source_type(&self) -> SourceType {
        SourceType::Concert
    }

    async fn fetch(&self) -> Result<Vec<Event>> {
        info!("Fetching concerts from {VENUE_NAME}");

        let ics_text = self
            .client
            .get(ICAL_URL)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let events = Self::parse_calendar(&ics_text);
        info!("Found {} events from {VENUE_NAME}", events.len());
        Ok(events)
    }
}
