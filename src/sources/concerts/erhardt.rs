//! Erhardt Café Hannover source.
//!
//! The site runs on Wix Events. Fetching happens in two steps: a dynamic
//! instance token from `/_api/v2/dynamicmodel`, then the events endpoint
//! queried with that token. This is more reliable than scraping the HTML,
//! which only renders a partial listing.

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

const URL: &str = "https://www.erhardt.cafe/events";
const BASE_URL: &str = "https://www.erhardt.cafe";
const DYNAMICMODEL_URL: &str = "https://www.erhardt.cafe/_api/v2/dynamicmodel";
const EVENTS_API_URL: &str = "https://www.erhardt.cafe/_api/wix-events-web/v1/events";
const VENUE_NAME: &str = "Erhardt Café";
const ADDRESS: &str = "Limmerstraße 46, 30451 Hannover";
const MAX_EVENTS: usize = 50;

// Wix Events app id, used to pick the instance token out of the dynamic model
const WIX_EVENTS_APP_ID: &str = "140603ad-af8d-84a5-2c80-a0f60cb47351";

pub struct ErhardtCafeSource {
    client: reqwest::Client,
}

impl ErhardtCafeSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(config.request_timeout())?,
        })
    }

    /// Pull the Wix instance token out of the dynamic model payload.
    pub fn extract_instance_token(data: &Value) -> Option<String> {
        data["apps"][WIX_EVENTS_APP_ID]["instance"]
            .as_str()
            .map(str::to_string)
    }

    /// Parse the events API payload. Past events and entries without a
    /// title or start date are skipped.
    pub fn parse_events(data: &Value, now: DateTime<Tz>) -> Vec<Event> {
        let list = match data["events"].as_array() {
            Some(list) => list,
            None => return Vec::new(),
        };

        let mut events: Vec<Event> = list
            .iter()
            .filter_map(|entry| Self::parse_wix_event(entry, now))
            .collect();

        events.sort_by_key(|event| event.date());
        events.truncate(MAX_EVENTS);
        events
    }

    fn parse_wix_event(entry: &Value, now: DateTime<Tz>) -> Option<Event> {
        let title = entry["title"].as_str()?.trim();
        if title.is_empty() {
            return None;
        }

        let scheduling = &entry["scheduling"];
        let start = scheduling["config"]["startDate"].as_str()?;
        let date = parse_iso_datetime(start)?;
        if date < now {
            return None;
        }

        let time_str = scheduling["startTimeFormatted"]
            .as_str()
            .unwrap_or("")
            .to_string();

        let address = entry["location"]["address"]
            .as_str()
            .unwrap_or(ADDRESS)
            .to_string();

        let url = match entry["slug"].as_str().filter(|s| !s.is_empty()) {
            Some(slug) => format!("{BASE_URL}/event-details/{slug}"),
            None => URL.to_string(),
        };

        let description = entry["description"]
            .as_str()
            .map(|d| sanitize_text(d, 200))
            .unwrap_or_default();

        let mut metadata = BTreeMap::new();
        metadata.insert("time".to_string(), time_str);
        metadata.insert("event_type".to_string(), infer_event_type(title).to_string());
        metadata.insert("address".to_string(), address);
        metadata.insert("description".to_string(), description);

        match Event::new(title, date, VENUE_NAME, url, EventCategory::Radar, metadata) {
            Ok(event) => Some(event),
            Err(error) => {
                debug!(%error, "rejecting Wix event");
                None
            }
        }
    }
}

/// Guess the listing type from the title; the café mixes chess nights,
/// quizzes, karaoke and live music under one calendar.
fn infer_event_type(title: &str) -> &'static str {
    let t = title.to_lowercase();
    if t.contains("schach") || t.contains("kniffel") {
        "games"
    } else if t.contains("quiz") {
        "quiz"
    } else if t.contains("karaoke") {
        "karaoke"
    } else if t.contains("live") || t.contains("konzert") {
        "concert"
    } else if t.contains("connect") || t.contains("social") {
        "social"
    } else {
        "event"
    }
}

#[async_trait]
impl EventSource for ErhardtCafeSource {
    fn source_id(&self) -> &'static str {
        "erhardt_cafe"
    }

    fn venue_name(&self) -> &'static str {
        VENUE_NAME
    }

    fn source_type(&self) -> SourceType {
        SourceType::Concert
    }

    async fn fetch(&self) -> Result<Vec<Event>> {
        info!("Fetching events from {VENUE_NAME}");

        let model: Value = self
            .client
            .get(DYNAMICMODEL_URL)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let instance = Self::extract_instance_token(&model).ok_or_else(|| {
            ScraperError::Source {
                message: "Wix instance token not found in dynamicmodel response".to_string(),
            }
        })?;

        let data: Value = self
            .client
            .get(EVENTS_API_URL)
            .query(&[
                ("instance", instance.as_str()),
                ("limit", "50"),
                ("offset", "0"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let events = Self::parse_events(&data, now_berlin());
        if events.is_empty() {
            warn!("no events returned from the Wix API - token flow may have changed");
        }
        info!("Found {} events from {VENUE_NAME}", events.len());
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::infer_event_type;

    #[test]
    fn infers_type_from_title() {
        assert_eq!(infer_event_type("Schachabend"), "games");
        assert_eq!(infer_event_type("Tablequiz Vol. 3"), "quiz");
        assert_eq!(infer_event_type("Live Musik: Duo Nord"), "concert");
        assert_eq!(infer_event_type("Offener Abend"), "event");
    }
}
