//! Punkrock-Konzerte Hannover source.
//!
//! The listings page annotates each gig row with schema.org/Event
//! microdata, so dates come from `meta[itemprop=startDate]` with a German
//! numeric date in the visible date box as fallback.

use crate::config::Config;
use crate::dates::{from_naive, now_berlin, parse_iso_date, parse_iso_datetime};
use crate::error::Result;
use crate::sources::{http_client, EventSource, SourceType};
use crate::types::{Event, EventCategory};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::{debug, info};

const URL: &str = "https://www.ce.punkrock-konzerte.de/gigs-termine-hannover/";
const VENUE_NAME: &str = "Punkrock-Konzerte";
const DEFAULT_HOUR: u32 = 20;
const MAX_EVENTS: usize = 60;

static GERMAN_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{2})\.(\d{2})\.(\d{4})\b").unwrap());

static SEL_ROW: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div.row[itemtype="http://schema.org/Event"]"#).unwrap());
static SEL_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("span.b").unwrap());
static SEL_VENUE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[itemprop='location'] [itemprop='name']").unwrap());
static SEL_CITY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[itemprop='location'] [itemprop='address']").unwrap());
static SEL_INFO_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a.info").unwrap());
static SEL_META_URL: Lazy<Selector> = Lazy::new(|| Selector::parse("meta[itemprop='url']").unwrap());
static SEL_META_START: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[itemprop='startDate']").unwrap());
static SEL_DATE_BOX: Lazy<Selector> = Lazy::new(|| Selector::parse("div.dateBox").unwrap());

pub struct PunkrockKonzerteSource {
    client: reqwest::Client,
}

impl PunkrockKonzerteSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(config.request_timeout())?,
        })
    }

    /// Parse the Hannover listings page; gigs already over are dropped.
    pub fn parse_page(html: &str, now: DateTime<Tz>) -> Vec<Event> {
        let document = Html::parse_document(html);
        let mut events = Vec::new();

        for row in document.select(&SEL_ROW) {
            match Self::parse_row(&row, now) {
                Some(event) => {
                    events.push(event);
                    if events.len() >= MAX_EVENTS {
                        break;
                    }
                }
                None => debug!("skipping unparseable gig row"),
            }
        }

        events
    }

    fn parse_row(row: &ElementRef, now: DateTime<Tz>) -> Option<Event> {
        let title = row
            .select(&SEL_TITLE)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())?;
        if title.is_empty() {
            return None;
        }

        let date = Self::extract_date(row)?;
        if date < now {
            return None;
        }

        let venue = row
            .select(&SEL_VENUE)
            .next()
            .map(|v| v.text().collect::<String>().trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| VENUE_NAME.to_string());

        let city = row
            .select(&SEL_CITY)
            .next()
            .map(|c| c.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let url = row
            .select(&SEL_INFO_LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
            .or_else(|| {
                row.select(&SEL_META_URL)
                    .next()
                    .and_then(|m| m.value().attr("content"))
            })
            .map(str::to_string)
            .unwrap_or_else(|| URL.to_string());

        let mut metadata = BTreeMap::new();
        metadata.insert("time".to_string(), date.format("%H:%M").to_string());
        metadata.insert("event_type".to_string(), "concert".to_string());
        metadata.insert("genre".to_string(), "Punk / Hardcore".to_string());
        metadata.insert("genre_source".to_string(), "source_implicit".to_string());
        metadata.insert("address".to_string(), city);

        Event::new(title, date, venue, url, EventCategory::Radar, metadata).ok()
    }

    fn extract_date(row: &ElementRef) -> Option<DateTime<Tz>> {
        if let Some(content) = row
            .select(&SEL_META_START)
            .next()
            .and_then(|m| m.value().attr("content"))
        {
            if let Some(parsed) = Self::parse_start_date(content) {
                return Some(parsed);
            }
        }

        let date_box = row.select(&SEL_DATE_BOX).next()?;
        let text = date_box.text().collect::<Vec<_>>().join(" ");
        let captures = GERMAN_DATE_RE.captures(&text)?;
        let day: u32 = captures[1].parse().ok()?;
        let month: u32 = captures[2].parse().ok()?;
        let year: i32 = captures[3].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        from_naive(date.and_hms_opt(DEFAULT_HOUR, 0, 0)?)
    }

    fn parse_start_date(value: &str) -> Option<DateTime<Tz>> {
        if value.contains('T') {
            let mut parsed = parse_iso_datetime(value)?;
            // Midnight means "date only"; default to the usual gig hour
            if parsed.format("%H%M").to_string() == "0000" {
                parsed = from_naive(parsed.date_naive().and_hms_opt(DEFAULT_HOUR, 0, 0)?)?;
            }
            return Some(parsed);
        }
        let date = parse_iso_date(value)?;
        from_naive(date.and_hms_opt(DEFAULT_HOUR, 0, 0)?)
    }
}

#[async_trait]
impl EventSource for PunkrockKonzerteSource {
    fn source_id(&self) -> &'static str {
        "punkrock_konzerte"
    }

    fn venue_name(&self) -> &'static str {
        VENUE_NAME
    }

    fn source_type(&self) -> SourceType {
        SourceType::Concert
    }

    async fn fetch(&self) -> Result<Vec<Event>> {
        info!("Fetching concerts from {VENUE_NAME}");

        let html = self
            .client
            .get(URL)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let events = Self::parse_page(&html, now_berlin());
        info!("Found {} events from {VENUE_NAME}", events.len());
        Ok(events)
    }
}
