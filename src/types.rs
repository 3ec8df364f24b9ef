use crate::error::{Result, ScraperError};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;

/// Validation limits acting as a circuit breaker: if a venue site changes
/// structure and a scraper grabs garbage, construction fails fast instead of
/// propagating bad data downstream.
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_VENUE_LENGTH: usize = 100;
pub const MAX_URL_LENGTH: usize = 500;

/// Closed set of event categories driving the output buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    /// Cinema showtime, eligible for the "this week" bucket.
    Movie,
    /// Concert/culture listing, eligible for the "on the radar" bucket.
    Radar,
}

/// Unified event structure for all sources.
///
/// Constructed once per scrape through [`Event::new`] and never mutated
/// afterwards; all fields are reachable through getters only. Dates are
/// always Europe/Berlin, enforced by the `DateTime<Tz>` type at the seam.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    title: String,
    date: DateTime<Tz>,
    venue: String,
    url: String,
    category: EventCategory,
    metadata: BTreeMap<String, String>,
}

impl Event {
    /// Validate and construct an event. Rejects empty/oversized titles and
    /// venues and URLs outside the http/https scheme allowlist.
    pub fn new(
        title: impl Into<String>,
        date: DateTime<Tz>,
        venue: impl Into<String>,
        url: impl Into<String>,
        category: EventCategory,
        metadata: BTreeMap<String, String>,
    ) -> Result<Self> {
        let title = title.into();
        let venue = venue.into();
        let url = url.into();

        if title.trim().is_empty() {
            return Err(ScraperError::Validation("event title cannot be empty".into()));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(ScraperError::Validation(format!(
                "title too long ({} chars > {MAX_TITLE_LENGTH}) - possible scraper error",
                title.chars().count()
            )));
        }
        if venue.trim().is_empty() {
            return Err(ScraperError::Validation("venue name cannot be empty".into()));
        }
        if venue.chars().count() > MAX_VENUE_LENGTH {
            return Err(ScraperError::Validation(format!(
                "venue name too long ({} chars > {MAX_VENUE_LENGTH})",
                venue.chars().count()
            )));
        }
        if url.chars().count() > MAX_URL_LENGTH {
            return Err(ScraperError::Validation(format!(
                "URL too long ({} chars > {MAX_URL_LENGTH})",
                url.chars().count()
            )));
        }
        let url_lower = url.to_ascii_lowercase();
        if !url_lower.starts_with("http://") && !url_lower.starts_with("https://") {
            let head: String = url.chars().take(50).collect();
            return Err(ScraperError::Validation(format!("invalid URL scheme: {head}")));
        }

        Ok(Self {
            title,
            date,
            venue,
            url,
            category,
            metadata,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn date(&self) -> DateTime<Tz> {
        self.date
    }

    pub fn venue(&self) -> &str {
        &self.venue
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn category(&self) -> EventCategory {
        self.category
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Format date as weekday and date (e.g., "Mon 24.11.").
    pub fn format_date_short(&self) -> String {
        self.date.format("%a %d.%m.").to_string()
    }

    /// Format as weekday and time (e.g., "Fri 19:30").
    pub fn format_time(&self) -> String {
        self.date.format("%a %H:%M").to_string()
    }
}
