//! Cafe Glocksee Hannover source.
//!
//! The venue publishes its program through the Prismic CMS API: one request
//! for the current master ref, then a paginated document search ordered by
//! event date.

use crate::config::Config;
use crate::dates::{now_berlin, parse_iso_datetime};
use crate::error::{Result, ScraperError};
use crate::sanitize::sanitize_text;
use crate::sources::{http_client, EventSource, SourceType};
use crate::types::{Event, EventCategory};
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

const PRISMIC_API_URL: &str = "https://cafe-glocksee.cdn.prismic.io/api/v2";
const BASE_URL: &str = "https://cafe-glocksee.de";
const VENUE_NAME: &str = "Glocksee";
const ADDRESS: &str = "Glockseestraße 35, 30169 Hannover";
const MAX_EVENTS: usize = 30;
const PAGE_SIZE: usize = 20;

pub struct GlockseeSource {
    client: reqwest::Client,
}

impl GlockseeSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(config.request_timeout())?,
        })
    }

    /// Pick the master ref out of the Prismic repository metadata.
    pub fn extract_master_ref(data: &Value) -> Option<String> {
        data["refs"].as_array()?.iter().find_map(|entry| {
            if entry["isMasterRef"].as_bool() == Some(true) {
                entry["ref"].as_str().map(str::to_string)
            } else {
                None
            }
        })
    }

    /// Parse one page of search results. Past events and documents missing
    /// title or datetime are skipped individually.
    pub fn parse_results(data: &Value, now: DateTime<Tz>) -> Vec<Event> {
        let results = match data["results"].as_array() {
            Some(results) => results,
            None => return Vec::new(),
        };
        results
            .iter()
            .filter_map(|result| Self::parse_document(result, now))
            .collect()
    }

    fn parse_document(result: &Value, now: DateTime<Tz>) -> Option<Event> {
        let data = &result["data"];

        let title = data["title"][0]["text"].as_str()?.trim();
        if title.is_empty() {
            return None;
        }

        let datetime_str = data["datetime"].as_str()?;
        let date = parse_iso_datetime(datetime_str)?;
        if date < now {
            return None;
        }

        let url = match result["uid"].as_str().filter(|uid| !uid.is_empty()) {
            Some(uid) => format!("{BASE_URL}/#/event/{uid}"),
            None => BASE_URL.to_string(),
        };

        let event_type = data["event_type"].as_str().unwrap_or("Konzert").to_string();

        // First two paragraphs of the rich-text body
        let description = data["text"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .take(2)
                    .filter(|part| part["type"].as_str() == Some("paragraph"))
                    .filter_map(|part| part["text"].as_str())
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .map(|text| sanitize_text(&text, 300))
            .unwrap_or_default();

        let image_url = data["teaser_image"]["url"].as_str().unwrap_or("").to_string();

        let support = data["bands"]
            .as_array()
            .map(|bands| {
                bands
                    .iter()
                    .filter_map(|band| {
                        let name = band["name"].as_str()?.trim();
                        let role = band["role"].as_str()?.trim();
                        if name.is_empty() || role.is_empty() {
                            None
                        } else {
                            Some(format!("{name} ({role})"))
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();

        let mut metadata = BTreeMap::new();
        metadata.insert("time".to_string(), date.format("%H:%M").to_string());
        metadata.insert("event_type".to_string(), event_type);
        metadata.insert("description".to_string(), description);
        if !image_url.is_empty() {
            metadata.insert("image_url".to_string(), image_url);
        }
        if !support.is_empty() {
            metadata.insert("support".to_string(), support);
        }

        match Event::new(title, date, VENUE_NAME, url, EventCategory::Radar, metadata) {
            Ok(event) => Some(event),
            Err(error) => {
                debug!(%error, "rejecting Glocksee document");
                None
            }
        }
    }
}

#[async_trait]
impl EventSource for GlockseeSource {
    fn source_id(&self) -> &'static str {
        "glocksee"
    }

    fn venue_name(&self) -> &'static str {
        VENUE_NAME
    }

    fn source_type(&self) -> SourceType {
        SourceType::Concert
    }

    async fn fetch(&self) -> Result<Vec<Event>> {
        info!("Fetching concerts from {VENUE_NAME}");

        let repo: Value = self
            .client
            .get(PRISMIC_API_URL)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let master_ref = Self::extract_master_ref(&repo).ok_or_else(|| ScraperError::Source {
            message: "no master ref in Prismic repository metadata".to_string(),
        })?;

        let now = now_berlin();
        let search_url = format!("{PRISMIC_API_URL}/documents/search");
        let mut events: Vec<Event> = Vec::new();
        let mut page = 1u32;

        loop {
            let page_str = page.to_string();
            let page_size_str = PAGE_SIZE.to_string();
            let response = self
                .client
                .get(&search_url)
                .query(&[
                    ("ref", master_ref.as_str()),
                    ("q", "[[at(document.type, \"event\")]]"),
                    ("orderings", "[my.event.datetime]"),
                    ("page", page_str.as_str()),
                    ("pageSize", page_size_str.as_str()),
                ])
                .send()
                .await;

            let data: Value = match response {
                Ok(resp) => match resp.error_for_status() {
                    Ok(resp) => resp.json().await?,
                    Err(error) => {
                        warn!(%error, "failed to fetch Prismic page {page}");
                        break;
                    }
                },
                Err(error) => {
                    warn!(%error, "failed to fetch Prismic page {page}");
                    break;
                }
            };

            let batch = Self::parse_results(&data, now);
            if batch.is_empty() && data["results"].as_array().map_or(true, |r| r.is_empty()) {
                break;
            }
            events.extend(batch);

            if events.len() >= MAX_EVENTS || data["next_page"].is_null() {
                break;
            }
            page += 1;
        }

        events.sort_by_key(|event| event.date());
        events.truncate(MAX_EVENTS);

        info!("Found {} events from {VENUE_NAME}", events.len());
        Ok(events)
    }
}
