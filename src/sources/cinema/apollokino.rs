//! Apollokino Hannover-Linden source.
//!
//! Parses the OmU-Nachtstudio page: repeated `div.datumzeile` date rows,
//! each followed by a `table.filmtabelle` holding `table.tagestabelle`
//! film rows. Showings not marked as OmU in the film note are dropped, as
//! are known non-film shows (comedy specials hosted at the cinema).

use crate::config::Config;
use crate::dates::{from_naive, parse_german_date};
use crate::error::Result;
use crate::sanitize::sanitize_text;
use crate::sources::{http_client, EventSource, SourceType};
use crate::types::{Event, EventCategory};
use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::{debug, info};

const PAGE_URL: &str = "https://www.apollokino.de/?mp=OmU-Nachtstudio";
const BASE_URL: &str = "https://www.apollokino.de/";
const VENUE_NAME: &str = "Apollokino Hannover";
const MAX_EVENTS: usize = 60;

// Known non-film shows hosted at the cinema
const BLACKLIST: [&str; 2] = ["desimo", "spezial club"];

static TIME_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<time>\d{1,2}:\d{2}):?\s*(?P<title>.+)$").unwrap());

static SEL_DATE_OR_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.datumzeile, table.filmtabelle").unwrap());
static SEL_ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("table.tagestabelle tr").unwrap());
static SEL_TD: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static SEL_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static SEL_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h2.filmtitel").unwrap());
static SEL_SYNOPSIS: Lazy<Selector> = Lazy::new(|| Selector::parse("div.filminhalt").unwrap());
static SEL_NOTE: Lazy<Selector> = Lazy::new(|| Selector::parse("div.filmanmerkung").unwrap());
static SEL_IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static SEL_FORM: Lazy<Selector> = Lazy::new(|| Selector::parse("form").unwrap());

pub struct ApollokinoSource {
    client: reqwest::Client,
}

impl ApollokinoSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(config.request_timeout())?,
        })
    }

    /// Parse the weekly OmU page. Date rows and film tables interleave in
    /// document order, so a single pass tracks the current date.
    pub fn parse_page(html: &str) -> Vec<Event> {
        let document = Html::parse_document(html);
        let mut events = Vec::new();
        let mut current_date: Option<NaiveDate> = None;

        for element in document.select(&SEL_DATE_OR_TABLE) {
            if element.value().name() == "div" {
                let date_text = text_of(&element);
                current_date = parse_german_date(&date_text);
                if current_date.is_none() {
                    debug!("could not parse date from: {date_text}");
                }
                continue;
            }

            let base_date = match current_date {
                Some(date) => date,
                None => continue,
            };

            for row in element.select(&SEL_ROW) {
                if events.len() >= MAX_EVENTS {
                    return events;
                }
                if let Some(event) = Self::parse_row(&row, base_date) {
                    events.push(event);
                }
            }
        }

        events
    }

    fn parse_row(row: &ElementRef, base_date: NaiveDate) -> Option<Event> {
        let td = row.select(&SEL_TD).next()?;

        let link = td.select(&SEL_LINK).next();
        let (title_text, detail_href) = match link {
            Some(a) => {
                let title = a
                    .select(&SEL_TITLE)
                    .next()
                    .map(|h2| text_of(&h2))
                    .unwrap_or_else(|| text_of(&a));
                (title, a.value().attr("href").unwrap_or("").to_string())
            }
            None => {
                let title = td.select(&SEL_TITLE).next().map(|h2| text_of(&h2))?;
                (title, String::new())
            }
        };

        let captures = TIME_TITLE_RE.captures(title_text.trim())?;
        let time_str = captures.name("time")?.as_str();
        let film_title = captures.name("title")?.as_str().trim().to_string();
        let film_title_lower = film_title.to_lowercase();

        let (hour, minute) = parse_time(time_str)?;
        let date = from_naive(base_date.and_hms_opt(hour, minute, 0)?)?;

        let note = td.select(&SEL_NOTE).next().map(|n| text_of(&n)).unwrap_or_default();
        let note_lower = note.to_lowercase();

        // The site marks OmU showings in the film note
        if !note_lower.contains("omu-nachtstudio") {
            debug!("skipping non-OmU showing: {film_title}");
            return None;
        }
        if BLACKLIST
            .iter()
            .any(|b| note_lower.contains(b) || film_title_lower.contains(b))
        {
            debug!("skipping blacklisted show: {film_title}");
            return None;
        }

        let synopsis = td
            .select(&SEL_SYNOPSIS)
            .next()
            .map(|s| sanitize_text(&text_of(&s), 300))
            .unwrap_or_default();

        let poster_url = td
            .select(&SEL_IMG)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|src| absolutize(src))
            .unwrap_or_default();

        let ticket_url = td
            .select(&SEL_FORM)
            .next()
            .and_then(|form| form.value().attr("action"))
            .map(absolutize)
            .unwrap_or_default();

        let detail_url = if detail_href.is_empty() {
            String::new()
        } else {
            absolutize(&detail_href)
        };

        // Prefer the detail page, then the ticket form, then the listing
        let event_url = [detail_url, ticket_url]
            .into_iter()
            .find(|u| !u.is_empty())
            .unwrap_or_else(|| PAGE_URL.to_string());

        let mut metadata = BTreeMap::new();
        metadata.insert("synopsis".to_string(), synopsis);
        metadata.insert("original_version".to_string(), "true".to_string());
        if !poster_url.is_empty() {
            metadata.insert("poster_url".to_string(), poster_url);
        }

        Event::new(film_title, date, VENUE_NAME, event_url, EventCategory::Movie, metadata).ok()
    }
}

fn text_of(element: &ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_time(value: &str) -> Option<(u32, u32)> {
    let (h, m) = value.split_once(':')?;
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

fn absolutize(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if let Some(stripped) = href.strip_prefix('/') {
        format!("{BASE_URL}{stripped}")
    } else {
        format!("{BASE_URL}{href}")
    }
}

#[async_trait]
impl EventSource for ApollokinoSource {
    fn source_id(&self) -> &'static str {
        "apollokino"
    }

    fn venue_name(&self) -> &'static str {
        VENUE_NAME
    }

    fn source_type(&self) -> SourceType {
        SourceType::Cinema
    }

    async fn fetch(&self) -> Result<Vec<Event>> {
        info!("Fetching Apollokino page: {PAGE_URL}");

        let html = self
            .client
            .get(PAGE_URL)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let events = Self::parse_page(&html);
        info!("Apollokino: parsed {} events", events.len());
        Ok(events)
    }
}
