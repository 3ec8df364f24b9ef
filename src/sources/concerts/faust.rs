//! Kulturzentrum Faust Hannover source.
//!
//! The venue site (REDAXO CMS) lists events per category. Three categories
//! are fetched: Livemusik and Party in full, Bühne (theater/comedy) filtered
//! to English-language shows. Event links encode the date as a DDMMYY slug;
//! time, sub-venue and price are parsed from the link's text lines.

use crate::config::Config;
use crate::dates::from_naive;
use crate::error::Result;
use crate::sources::{http_client, EventSource, SourceType};
use crate::types::{Event, EventCategory};
use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, warn};

const BASE_URL: &str = "https://www.kulturzentrum-faust.de";
const VENUE_NAME: &str = "Faust";
const ADDRESS: &str = "Zur Bettfedernfabrik 3, 30451 Hannover";
const MAX_EVENTS: usize = 40;

// (rub parameter, event type, English-only filter)
const CATEGORIES: [(u8, &str, bool); 3] = [
    (2, "concert", false), // Livemusik
    (1, "party", false),   // Party
    (4, "theater", true),  // Bühne, English shows only
];

const ENGLISH_KEYWORDS: [&str; 7] = [
    "english",
    "englisch",
    " en ",
    "(en)",
    "[en]",
    "in english",
    "auf englisch",
];

const KNOWN_LOCATIONS: [&str; 6] = [
    "60er-Jahre Halle",
    "Mephisto",
    "Warenannahme",
    "Kunsthalle",
    "Café",
    "Gretchen",
];

static EVENT_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/veranstaltungen/\w+/(\d{2})(\d{2})(\d{2})-[\w-]+\.html").unwrap());
static DATE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2},\s*\d{1,2}\.\d{1,2}\.\d{2}").unwrap());
static BEGIN_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Beginn[:\s]*(\d{1,2})[:\.](\d{2})").unwrap());
static SIMPLE_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})[:\.](\d{2})\s*Uhr").unwrap());

static SEL_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static SEL_IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

pub struct FaustSource {
    client: reqwest::Client,
}

impl FaustSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(config.request_timeout())?,
        })
    }

    /// Parse one category page. `seen` deduplicates hrefs across category
    /// pages, since the same event can be listed under several rubrics.
    pub fn parse_page(
        html: &str,
        event_type: &str,
        requires_english: bool,
        seen: &mut HashSet<String>,
    ) -> Vec<Event> {
        let document = Html::parse_document(html);
        let mut events = Vec::new();

        for link in document.select(&SEL_LINK) {
            let href = link.value().attr("href").unwrap_or("");
            if !EVENT_HREF_RE.is_match(href) {
                continue;
            }
            if !seen.insert(href.to_string()) {
                continue;
            }
            match Self::parse_event_link(&link, href, event_type, requires_english) {
                Some(event) => events.push(event),
                None => debug!("skipping Faust link: {href}"),
            }
        }

        events
    }

    fn parse_event_link(
        link: &ElementRef,
        href: &str,
        event_type: &str,
        requires_english: bool,
    ) -> Option<Event> {
        let url = if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{BASE_URL}{href}")
        };

        let date = Self::date_from_href(href)?;

        let lines: Vec<String> = link
            .text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if lines.is_empty() {
            return None;
        }

        let parsed = parse_event_lines(&lines);
        if parsed.title.is_empty() {
            return None;
        }

        if requires_english {
            let full_text = format!("{} {}", parsed.title, lines.join(" ")).to_lowercase();
            if !ENGLISH_KEYWORDS.iter().any(|kw| full_text.contains(kw)) {
                debug!("skipping non-English Bühne event: {}", parsed.title);
                return None;
            }
        }

        let (hour, minute) = parsed.time;
        let event_date = from_naive(date.and_hms_opt(hour, minute, 0)?)?;

        let image_url = link
            .select(&SEL_IMG)
            .next()
            .and_then(|img| img.value().attr("src").or_else(|| img.value().attr("data-src")))
            .map(|src| {
                if src.starts_with("http") {
                    src.to_string()
                } else {
                    format!("{BASE_URL}{src}")
                }
            })
            .unwrap_or_default();

        let mut metadata = BTreeMap::new();
        metadata.insert("time".to_string(), format!("{hour:02}:{minute:02}"));
        metadata.insert("location".to_string(), parsed.location);
        metadata.insert("price".to_string(), parsed.price);
        metadata.insert("event_type".to_string(), event_type.to_string());
        metadata.insert("address".to_string(), ADDRESS.to_string());
        if !image_url.is_empty() {
            metadata.insert("image_url".to_string(), image_url);
        }

        Event::new(parsed.title, event_date, VENUE_NAME, url, EventCategory::Radar, metadata).ok()
    }

    /// Extract the date from the URL slug: `/veranstaltungen/november/211125-le-fly.html`
    /// encodes 21.11.25.
    fn date_from_href(href: &str) -> Option<NaiveDate> {
        let captures = EVENT_HREF_RE.captures(href)?;
        let day: u32 = captures.get(1)?.as_str().parse().ok()?;
        let month: u32 = captures.get(2)?.as_str().parse().ok()?;
        let year: i32 = captures.get(3)?.as_str().parse().ok()?;
        NaiveDate::from_ymd_opt(2000 + year, month, day)
    }
}

struct ParsedLines {
    title: String,
    time: (u32, u32),
    location: String,
    price: String,
}

/// Walk the link's text lines: skip the date line, pull begin time, price
/// and sub-venue; the first remaining substantial line is the title.
fn parse_event_lines(lines: &[String]) -> ParsedLines {
    let mut title = String::new();
    let mut time = (20, 0);
    let mut location = String::new();
    let mut price = String::new();

    for line in lines {
        if DATE_LINE_RE.is_match(line) {
            continue;
        }

        if let Some(captures) = BEGIN_TIME_RE.captures(line) {
            if let (Ok(h), Ok(m)) = (captures[1].parse(), captures[2].parse()) {
                time = (h, m);
            }
            continue;
        }
        if line.contains("Einlass") || line.contains("Beginn") {
            if let Some(captures) = SIMPLE_TIME_RE.captures(line) {
                if let (Ok(h), Ok(m)) = (captures[1].parse(), captures[2].parse()) {
                    time = (h, m);
                }
            }
            continue;
        }

        if line.contains("VVK") || line.contains("AK") || line.contains('€') {
            price = line.clone();
            continue;
        }

        if KNOWN_LOCATIONS.iter().any(|loc| line.contains(loc)) {
            location = line.clone();
            continue;
        }

        if title.is_empty() && line.chars().count() > 3 {
            title = line.clone();
        }
    }

    ParsedLines { title, time, location, price }
}

#[async_trait]
impl EventSource for FaustSource {
    fn source_id(&self) -> &'static str {
        "faust_hannover"
    }

    fn venue_name(&self) -> &'static str {
        VENUE_NAME
    }

    fn source_type(&self) -> SourceType {
        SourceType::Concert
    }

    async fn fetch(&self) -> Result<Vec<Event>> {
        info!("Fetching events from {VENUE_NAME}");

        let mut all_events: Vec<Event> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (rub, event_type, requires_english) in CATEGORIES {
            let url = format!("{BASE_URL}/veranstaltungen.html?rub={rub}");
            let page = async {
                self.client
                    .get(&url)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await
            }
            .await;

            match page {
                Ok(html) => {
                    let events = Self::parse_page(&html, event_type, requires_english, &mut seen);
                    debug!("category rub={rub} ({event_type}): found {} events", events.len());
                    all_events.extend(events);
                }
                Err(error) => {
                    warn!(%error, "failed to fetch Faust category rub={rub}");
                }
            }

            // Small pause between category requests against the same host
            tokio::time::sleep(Duration::from_millis(300)).await;
        }

        all_events.sort_by_key(|event| event.date());
        all_events.truncate(MAX_EVENTS);

        info!("Found {} events from {VENUE_NAME}", all_events.len());
        Ok(all_events)
    }
}
