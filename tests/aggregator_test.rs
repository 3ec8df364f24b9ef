use async_trait::async_trait;
use boring_hannover::aggregator::fetch_events;
use boring_hannover::categorizer::categorize;
use boring_hannover::config::Config;
use boring_hannover::dates::berlin_datetime;
use boring_hannover::error::{Result, ScraperError};
use boring_hannover::sources::{EventSource, SourceType};
use boring_hannover::types::{Event, EventCategory};
use std::collections::BTreeMap;

struct FixedSource {
    id: &'static str,
    events: Vec<Event>,
}

#[async_trait]
impl EventSource for FixedSource {
    fn source_id(&self) -> &'static str {
        self.id
    }

    fn venue_name(&self) -> &'static str {
        "Test Venue"
    }

    fn source_type(&self) -> SourceType {
        SourceType::Concert
    }

    async fn fetch(&self) -> Result<Vec<Event>> {
        Ok(self.events.clone())
    }
}

struct FailingSource {
    id: &'static str,
}

#[async_trait]
impl EventSource for FailingSource {
    fn source_id(&self) -> &'static str {
        self.id
    }

    fn venue_name(&self) -> &'static str {
        "Broken Venue"
    }

    fn source_type(&self) -> SourceType {
        SourceType::Concert
    }

    async fn fetch(&self) -> Result<Vec<Event>> {
        Err(ScraperError::Source {
            message: "connection timed out".to_string(),
        })
    }
}

fn fast_config() -> Config {
    Config {
        scrape_delay_seconds: 0,
        ..Config::default()
    }
}

fn event(title: &str, day: u32, category: EventCategory) -> Event {
    Event::new(
        title,
        berlin_datetime(2026, 9, day, 20, 0).unwrap(),
        "Test Venue",
        "https://example.com/event",
        category,
        BTreeMap::new(),
    )
    .unwrap()
}

#[tokio::test]
async fn failed_source_is_isolated_and_order_preserved() {
    let first = FixedSource {
        id: "first",
        events: vec![event("A", 10, EventCategory::Radar)],
    };
    let broken = FailingSource { id: "broken" };
    let last = FixedSource {
        id: "last",
        events: vec![
            event("B", 11, EventCategory::Radar),
            event("C", 12, EventCategory::Radar),
        ],
    };

    let sources: Vec<&dyn EventSource> = vec![&first, &broken, &last];
    let combined = fetch_events(&sources, &fast_config()).await;

    let titles: Vec<&str> = combined.iter().map(|e| e.title()).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn all_sources_failing_yields_empty_list_without_panicking() {
    let a = FailingSource { id: "a" };
    let b = FailingSource { id: "b" };
    let sources: Vec<&dyn EventSource> = vec![&a, &b];

    let combined = fetch_events(&sources, &fast_config()).await;
    assert!(combined.is_empty());
}

#[tokio::test]
async fn run_with_one_timed_out_source_still_produces_the_other_bucket() {
    // One cinema source returns three showings, the concert source fails.
    let cinema = FixedSource {
        id: "cinema",
        events: vec![
            event("Film One", 8, EventCategory::Movie),
            event("Film Two", 9, EventCategory::Movie),
            event("Film Three", 10, EventCategory::Movie),
        ],
    };
    let concerts = FailingSource { id: "concerts" };
    let sources: Vec<&dyn EventSource> = vec![&cinema, &concerts];

    let combined = fetch_events(&sources, &fast_config()).await;
    let now = berlin_datetime(2026, 9, 7, 0, 0).unwrap();
    let buckets = categorize(combined, now, 7);

    assert_eq!(buckets.movies_this_week.len(), 3);
    assert!(buckets.big_events_radar.is_empty());
}
