//! Weltspiele (Weidendamm) club source.
//!
//! The program overview only carries day/month and tags; each event's
//! detail page has the exact time and full title, so one extra request per
//! entry fills those in. Detail-page failures fall back to the overview
//! data with the club's usual 22:00 start.

use crate::config::Config;
use crate::dates::{from_naive, future_date, month_number};
use crate::error::Result;
use crate::sources::{http_client, EventSource, SourceType};
use crate::types::{Event, EventCategory};
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::{debug, info};

const PROGRAM_URL: &str = "https://weltspiele.club/programm/";
const BASE_URL: &str = "https://weltspiele.club";
const VENUE_NAME: &str = "Weltspiele";
const ADDRESS: &str = "Weidendamm 8, 30167 Hannover";
const MAX_EVENTS: usize = 30;
const DEFAULT_HOUR: u32 = 22;

static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})").unwrap());
static DAY_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s+([A-Za-zÄÖÜäöü]+)").unwrap());
static DAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2})").unwrap());

static SEL_MONTH: Lazy<Selector> = Lazy::new(|| Selector::parse("div.program-month").unwrap());
static SEL_MONTH_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".program-month-title").unwrap());
static SEL_ENTRY_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static SEL_EVENT_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li.program-event").unwrap());
static SEL_DAY: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".program-event-header .in-brackets").unwrap());
static SEL_TAG: Lazy<Selector> = Lazy::new(|| Selector::parse(".program-event-tag").unwrap());
static SEL_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("div.underline").unwrap());
static SEL_LINEUP: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".program-event-place .underline-rich-text-box").unwrap());
static SEL_SHOW_DATE: Lazy<Selector> = Lazy::new(|| Selector::parse(".show-date").unwrap());
static SEL_EVENT_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h1.event-title").unwrap());

/// One entry off the program overview page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramEntry {
    pub title: String,
    pub day: u32,
    pub month: u32,
    pub url: String,
    pub tag: Option<String>,
    pub lineup: Option<String>,
}

pub struct WeltspieleSource {
    client: reqwest::Client,
}

impl WeltspieleSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(config.request_timeout())?,
        })
    }

    /// Parse the program overview into entries (month blocks, each with
    /// linked event items).
    pub fn parse_program(html: &str) -> Vec<ProgramEntry> {
        let document = Html::parse_document(html);
        let mut entries = Vec::new();

        for month_block in document.select(&SEL_MONTH) {
            let month_name = month_block
                .select(&SEL_MONTH_TITLE)
                .next()
                .map(|t| t.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            let Some(month) = month_number(&month_name) else { continue };

            for link in month_block.select(&SEL_ENTRY_LINK) {
                let Some(item) = link.select(&SEL_EVENT_ITEM).next() else { continue };
                match Self::parse_entry(&link, &item, month) {
                    Some(entry) => entries.push(entry),
                    None => debug!("skipping unparseable program entry"),
                }
            }
        }

        entries
    }

    fn parse_entry(link: &ElementRef, item: &ElementRef, month: u32) -> Option<ProgramEntry> {
        let href = link.value().attr("href")?.trim();
        if href.is_empty() {
            return None;
        }
        let url = if let Some(stripped) = href.strip_prefix('/') {
            format!("{BASE_URL}/{stripped}")
        } else {
            href.to_string()
        };

        let day_text = item
            .select(&SEL_DAY)
            .next()
            .map(|d| d.text().collect::<Vec<_>>().join(" "))?;
        let day: u32 = DAY_RE.captures(&day_text)?.get(1)?.as_str().parse().ok()?;

        // Skip lineup boxes that reuse the underline class
        let title = item
            .select(&SEL_TITLE)
            .filter(|el| {
                !el.value()
                    .classes()
                    .any(|class| class == "underline-rich-text-box")
            })
            .map(|el| el.text().collect::<String>().trim().to_string())
            .find(|t| !t.is_empty())?;

        let tag = item
            .select(&SEL_TAG)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());

        let lineup = {
            let text = item
                .select(&SEL_LINEUP)
                .map(|block| block.text().collect::<Vec<_>>().join(" "))
                .collect::<Vec<_>>()
                .join(" ");
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        };

        Some(ProgramEntry { title, day, month, url, tag, lineup })
    }

    /// Parse a detail page's show-date string like "Sat 27 January 22:00-10:00".
    pub fn parse_show_date(text: &str) -> Option<DateTime<Tz>> {
        let time_captures = TIME_RE.captures(text)?;
        let hour: u32 = time_captures[1].parse().ok()?;
        let minute: u32 = time_captures[2].parse().ok()?;

        let date_captures = DAY_MONTH_RE.captures(text)?;
        let day: u32 = date_captures[1].parse().ok()?;
        let month = month_number(&date_captures[2])?;

        let date = future_date(day, month)?;
        from_naive(date.and_hms_opt(hour, minute, 0)?)
    }

    fn build_event(&self, entry: &ProgramEntry, detail: Option<DetailPage>) -> Option<Event> {
        let mut date = from_naive(
            future_date(entry.day, entry.month)?.and_hms_opt(DEFAULT_HOUR, 0, 0)?,
        )?;
        let mut page_ok = false;
        let mut title = entry.title.clone();

        if let Some(detail) = detail {
            page_ok = true;
            if let Some(show_date) = detail.show_date.and_then(|t| Self::parse_show_date(&t)) {
                date = show_date;
            }
            if let Some(page_title) = detail.title {
                title = page_title;
            }
        }

        let event_url = if page_ok {
            entry.url.clone()
        } else {
            PROGRAM_URL.to_string()
        };

        let mut metadata = BTreeMap::new();
        metadata.insert("time".to_string(), date.format("%H:%M").to_string());
        metadata.insert(
            "subtitle".to_string(),
            entry
                .lineup
                .as_deref()
                .map(|l| l.chars().take(200).collect())
                .unwrap_or_default(),
        );
        metadata.insert(
            "event_type".to_string(),
            entry.tag.clone().unwrap_or_else(|| "club".to_string()),
        );
        metadata.insert("address".to_string(), ADDRESS.to_string());

        Event::new(title, date, VENUE_NAME, event_url, EventCategory::Radar, metadata).ok()
    }

    async fn fetch_detail(&self, url: &str) -> Option<DetailPage> {
        let response = self.client.get(url).send().await.ok()?;
        if !response.status().is_success() {
            debug!("Weltspiele event page returned {}: {url}", response.status());
            return None;
        }
        let html = response.text().await.ok()?;
        let document = Html::parse_document(&html);

        let show_date = document
            .select(&SEL_SHOW_DATE)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" "));
        let title = document
            .select(&SEL_EVENT_TITLE)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());

        Some(DetailPage { show_date, title })
    }
}

struct DetailPage {
    show_date: Option<String>,
    title: Option<String>,
}

#[async_trait]
impl EventSource for WeltspieleSource {
    fn source_id(&self) -> &'static str {
        "weltspiele"
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
            .get(PROGRAM_URL)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let entries = Self::parse_program(&html);

        let mut events = Vec::new();
        for entry in &entries {
            let detail = self.fetch_detail(&entry.url).await;
            if let Some(event) = self.build_event(entry, detail) {
                events.push(event);
                if events.len() >= MAX_EVENTS {
                    break;
                }
            }
        }

        info!("Found {} events from {VENUE_NAME}", events.len());
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn show_date_parses_time_and_day() {
        let parsed = WeltspieleSource::parse_show_date("Sat 27 January 22:00-10:00").unwrap();
        assert_eq!(parsed.hour(), 22);
        assert_eq!(parsed.minute(), 0);
    }

    #[test]
    fn show_date_without_time_is_none() {
        assert!(WeltspieleSource::parse_show_date("Sat 27 January").is_none());
    }
}
