//! Broncos Hannover source, via the Stadtkind Kalender venue page.
//!
//! Stadtkind serves structured HTML with an ISO datetime per event card,
//! which is stable and avoids scraping social media.

use crate::config::Config;
use crate::dates::parse_iso_datetime;
use crate::error::Result;
use crate::genre::normalize_genre;
use crate::sources::{http_client, EventSource, SourceType};
use crate::types::{Event, EventCategory};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::{debug, info};

const URL: &str = "https://www.stadtkind-kalender.de/ort/broncos";
const BASE_URL: &str = "https://www.stadtkind-kalender.de";
const VENUE_NAME: &str = "Broncos";
const ADDRESS: &str = "Schwarzer Bär 7, 30449 Hannover";
const MAX_EVENTS: usize = 40;

static SEL_EVENT: Lazy<Selector> = Lazy::new(|| Selector::parse("article.event").unwrap());
static SEL_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a.event__link").unwrap());
static SEL_TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time.event__start-time").unwrap());
static SEL_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h3.event__title").unwrap());
static SEL_TAGLINE: Lazy<Selector> = Lazy::new(|| Selector::parse("span.event__tagline").unwrap());

pub struct BroncosSource {
    client: reqwest::Client,
}

impl BroncosSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(config.request_timeout())?,
        })
    }

    pub fn parse_page(html: &str) -> Vec<Event> {
        let document = Html::parse_document(html);
        let mut events = Vec::new();

        for card in document.select(&SEL_EVENT) {
            match Self::parse_card(&card) {
                Some(event) => {
                    events.push(event);
                    if events.len() >= MAX_EVENTS {
                        break;
                    }
                }
                None => debug!("skipping unparseable Broncos card"),
            }
        }

        events
    }

    fn parse_card(card: &ElementRef) -> Option<Event> {
        let href = card
            .select(&SEL_LINK)
            .next()?
            .value()
            .attr("href")?
            .trim()
            .to_string();
        if href.is_empty() {
            return None;
        }
        let url = if let Some(stripped) = href.strip_prefix('/') {
            format!("{BASE_URL}/{stripped}")
        } else {
            href
        };

        let datetime_attr = card.select(&SEL_TIME).next()?.value().attr("datetime")?;
        let date = parse_iso_datetime(datetime_attr)?;

        let title = card
            .select(&SEL_TITLE)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())?;
        if title.is_empty() {
            return None;
        }

        let raw_genre = card
            .select(&SEL_TAGLINE)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        let genre = normalize_genre(&raw_genre);

        let mut metadata = BTreeMap::new();
        metadata.insert("time".to_string(), date.format("%H:%M").to_string());
        metadata.insert(
            "genre".to_string(),
            genre.map(str::to_string).unwrap_or_else(|| raw_genre.clone()),
        );
        if !raw_genre.is_empty() {
            metadata.insert("genre_source".to_string(), "stadtkind_tagline".to_string());
        }
        metadata.insert("event_type".to_string(), "concert".to_string());
        metadata.insert("address".to_string(), ADDRESS.to_string());

        Event::new(title, date, VENUE_NAME, url, EventCategory::Radar, metadata).ok()
    }
}

#[async_trait]
impl EventSource for BroncosSource {
    fn source_id(&self) -> &'static str {
        "broncos"
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

        let events = Self::parse_page(&html);
        info!("Found {} events from {VENUE_NAME}", events.len());
        Ok(events)
    }
}
