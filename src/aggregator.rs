//! Sequential fan-out over all registered sources.
//!
//! No source failure may abort the batch: every fetch runs inside a failure
//! boundary and contributes zero records on error. A fixed politeness delay
//! separates source fetches; it does not react to latency or errors.

use crate::config::Config;
use crate::sources::EventSource;
use crate::types::Event;
use tracing::{info, warn, Instrument};

/// Fetch from every given source in order, isolating failures.
///
/// Always returns a combined list (possibly empty). The delay is applied
/// between invocations, never before the first, and failed sources still
/// count toward the pacing.
pub async fn fetch_events(sources: &[&dyn EventSource], config: &Config) -> Vec<Event> {
    let mut combined: Vec<Event> = Vec::new();

    for (index, source) in sources.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(config.scrape_delay()).await;
        }

        let span = tracing::info_span!("source_fetch", source = source.source_id());
        match source.fetch().instrument(span).await {
            Ok(events) => {
                info!(
                    source = source.source_id(),
                    count = events.len(),
                    "source fetched"
                );
                combined.extend(events);
            }
            Err(error) => {
                // Graceful degradation: a failed source narrows coverage,
                // it never fails the run.
                warn!(source = source.source_id(), %error, "source failed");
            }
        }
    }

    info!(total = combined.len(), "aggregation complete");
    combined
}

/// Convenience wrapper over the whole registry.
pub async fn fetch_all_events(
    registry: &crate::registry::SourceRegistry,
    config: &Config,
) -> Vec<Event> {
    let sources: Vec<&dyn EventSource> = registry.all().collect();
    fetch_events(&sources, config).await
}
