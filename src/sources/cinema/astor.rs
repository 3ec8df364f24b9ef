//! Astor Grand Cinema source.
//!
//! The cinema runs on the premiumkino platform, which exposes the weekly
//! program as a JSON API: one `movies` array and one `performances` array
//! joined by movie id. Only original-version (OV/OmU) performances are kept.

use crate::config::Config;
use crate::dates::parse_iso_datetime;
use crate::error::Result;
use crate::sanitize::sanitize_url;
use crate::sources::cinema::is_original_version;
use crate::sources::{http_client, EventSource, SourceType};
use crate::types::{Event, EventCategory};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

const API_URL: &str = "https://backend.premiumkino.de/v1/de/hannover/program";
const PAGE_URL: &str = "https://hannover.premiumkino.de/";
const VENUE_NAME: &str = "Astor Grand Cinema";
const MAX_EVENTS: usize = 100;

pub struct AstorSource {
    client: reqwest::Client,
}

impl AstorSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(config.request_timeout())?,
        })
    }

    /// Parse the program API payload into movie events.
    ///
    /// Performances referencing an unknown movie id, missing a begin time,
    /// or carrying a dubbed version tag are skipped individually.
    pub fn parse_program(data: &Value) -> Vec<Event> {
        let movies: HashMap<&str, &Value> = data["movies"]
            .as_array()
            .map(|list| {
                list.iter()
                    .filter_map(|movie| movie["id"].as_str().map(|id| (id, movie)))
                    .collect()
            })
            .unwrap_or_default();

        let performances = match data["performances"].as_array() {
            Some(list) => list,
            None => return Vec::new(),
        };

        let mut events = Vec::new();
        for perf in performances {
            if events.len() >= MAX_EVENTS {
                break;
            }
            match Self::parse_performance(perf, &movies) {
                Some(event) => events.push(event),
                None => debug!("skipping unparseable performance"),
            }
        }
        events
    }

    fn parse_performance(perf: &Value, movies: &HashMap<&str, &Value>) -> Option<Event> {
        let movie_id = perf["movieId"].as_str()?;
        let movie = movies.get(movie_id)?;
        let title = movie["name"].as_str()?.trim();
        if title.is_empty() {
            return None;
        }

        let begin = perf["begin"].as_str()?;
        let date = parse_iso_datetime(begin)?;

        let version = perf["language"].as_str().unwrap_or("");
        if !is_original_version(version) {
            return None;
        }

        let url = movie["slug"]
            .as_str()
            .map(|slug| sanitize_url(&format!("{PAGE_URL}film/{slug}")))
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| PAGE_URL.to_string());

        let mut metadata = BTreeMap::new();
        metadata.insert("version".to_string(), version.to_string());
        metadata.insert("original_version".to_string(), "true".to_string());
        if let Some(minutes) = movie["minutes"].as_u64() {
            metadata.insert("duration".to_string(), minutes.to_string());
        }
        if let Some(rating) = movie["fsk"].as_u64() {
            metadata.insert("rating".to_string(), rating.to_string());
        }

        Event::new(title, date, VENUE_NAME, url, EventCategory::Movie, metadata).ok()
    }
}

#[async_trait]
impl EventSource for AstorSource {
    fn source_id(&self) -> &'static str {
        "astor"
    }

    fn venue_name(&self) -> &'static str {
        VENUE_NAME
    }

    fn source_type(&self) -> SourceType {
        SourceType::Cinema
    }

    async fn fetch(&self) -> Result<Vec<Event>> {
        info!("Fetching program from {}", VENUE_NAME);

        let data: Value = self
            .client
            .get(API_URL)
            .header("Accept", "application/json, text/plain, */*")
            .header("Referer", PAGE_URL)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let events = Self::parse_program(&data);
        info!("Astor: parsed {} OV showings", events.len());
        Ok(events)
    }
}
