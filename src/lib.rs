//! Weekly Hannover event digest: scrapes a fixed set of cinema and concert
//! venue sites, merges the results and writes a two-section digest.

pub mod aggregator;
pub mod categorizer;
pub mod config;
pub mod dates;
pub mod error;
pub mod genre;
pub mod logging;
pub mod notifier;
pub mod registry;
pub mod sanitize;
pub mod sources;
pub mod types;
