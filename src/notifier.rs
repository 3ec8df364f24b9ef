//! Output boundary for the weekly digest.
//!
//! Bucket assembly is separated from delivery behind [`EventSink`], so the
//! aggregation pipeline never knows where its results end up. The default
//! sink writes the digest and a JSON export into the output directory.

use crate::categorizer::Buckets;
use crate::config::Config;
use crate::error::{Result, ScraperError};
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Delivery target for a finished run.
#[async_trait]
pub trait EventSink: Send + Sync {
    fn name(&self) -> &'static str;
    async fn deliver(&self, buckets: &Buckets) -> Result<()>;
}

/// Render the two-section plain-text digest.
///
/// Empty buckets get an explicit placeholder line so a quiet week is
/// distinguishable from a broken run.
pub fn format_message(buckets: &Buckets) -> String {
    let mut out = String::new();

    out.push_str("🎬 Movies this week\n");
    if buckets.movies_this_week.is_empty() {
        out.push_str("  (nothing found)\n");
    }
    for event in &buckets.movies_this_week {
        out.push_str(&format!(
            "  {} {} @ {}\n    {}\n",
            event.format_time(),
            event.title(),
            event.venue(),
            event.url()
        ));
    }

    out.push_str("\n📅 On the radar\n");
    if buckets.big_events_radar.is_empty() {
        out.push_str("  (nothing found)\n");
    }
    for event in &buckets.big_events_radar {
        out.push_str(&format!(
            "  {} {} @ {}\n    {}\n",
            event.format_date_short(),
            event.title(),
            event.venue(),
            event.url()
        ));
    }

    out
}

/// Writes `events.json` and `digest.txt` into the configured output
/// directory, creating it if needed.
pub struct LocalSink {
    output_dir: PathBuf,
}

impl LocalSink {
    pub fn new(config: &Config) -> Self {
        Self {
            output_dir: PathBuf::from(&config.output_dir),
        }
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: dir.into() }
    }
}

#[async_trait]
impl EventSink for LocalSink {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn deliver(&self, buckets: &Buckets) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;

        let json_path = self.output_dir.join("events.json");
        let export = serde_json::json!({
            "movies_this_week": buckets.movies_this_week,
            "big_events_radar": buckets.big_events_radar,
        });
        let json = serde_json::to_string_pretty(&export)?;
        fs::write(&json_path, json)?;

        let digest_path = self.output_dir.join("digest.txt");
        fs::write(&digest_path, format_message(buckets))?;

        info!(
            movies = buckets.movies_this_week.len(),
            radar = buckets.big_events_radar.len(),
            path = %self.output_dir.display(),
            "digest written"
        );
        Ok(())
    }
}

/// Run every sink; the first failure is returned after all sinks ran.
pub async fn deliver_all(sinks: &[Box<dyn EventSink>], buckets: &Buckets) -> Result<()> {
    let mut first_error: Option<ScraperError> = None;
    for sink in sinks {
        if let Err(error) = sink.deliver(buckets).await {
            tracing::warn!(sink = sink.name(), %error, "sink delivery failed");
            if first_error.is_none() {
                first_error = Some(error);
            }
        }
    }
    match first_error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
