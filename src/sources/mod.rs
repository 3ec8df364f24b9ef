//! Source adapters: one fetch+parse unit per venue.
//!
//! Every adapter owns its fixed endpoint configuration, fetches with its own
//! bounded-timeout client, applies its venue-specific filtering, and skips
//! individual listings it cannot parse. Top-level failures propagate; the
//! aggregator isolates them.

use crate::error::Result;
use crate::types::Event;
use async_trait::async_trait;
use std::time::Duration;

pub mod cinema;
pub mod concerts;

/// Identifying header sent with every outbound request.
pub const USER_AGENT: &str = "boring-hannover/0.3 (weekly event digest; contact via repo)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Cinema,
    Concert,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Cinema => "cinema",
            SourceType::Concert => "concert",
        }
    }
}

/// Contract shared by all nine venue integrations.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Unique registry identifier for this source.
    fn source_id(&self) -> &'static str;

    /// Human-readable venue name.
    fn venue_name(&self) -> &'static str;

    fn source_type(&self) -> SourceType;

    /// Fetch and parse all events this source currently lists.
    async fn fetch(&self) -> Result<Vec<Event>>;
}

/// Build the per-source HTTP client: bounded timeout, identifying UA.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .gzip(true)
        .build()?;
    Ok(client)
}
