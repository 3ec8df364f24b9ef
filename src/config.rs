use crate::error::{Result, ScraperError};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Immutable runtime configuration, loaded once at startup and passed by
/// reference into source constructors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Delay between source fetches, to stay polite with venue sites.
    pub scrape_delay_seconds: u64,
    /// Per-request network timeout for every source client.
    pub request_timeout_seconds: u64,
    /// How far ahead movie showtimes are included, in days.
    pub movies_lookahead_days: i64,
    /// Directory for exported output files.
    pub output_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scrape_delay_seconds: 1,
            request_timeout_seconds: 30,
            movies_lookahead_days: 7,
            output_dir: "output".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `config.toml` if present, otherwise defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.movies_lookahead_days < 0 {
            return Err(ScraperError::Config(
                "movies_lookahead_days must not be negative".to_string(),
            ));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ScraperError::Config(
                "request_timeout_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn scrape_delay(&self) -> Duration {
        Duration::from_secs(self.scrape_delay_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_policy() {
        let config = Config::default();
        assert_eq!(config.scrape_delay_seconds, 1);
        assert_eq!(config.request_timeout_seconds, 30);
        assert_eq!(config.movies_lookahead_days, 7);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str("movies_lookahead_days = 14").unwrap();
        assert_eq!(config.movies_lookahead_days, 14);
        assert_eq!(config.scrape_delay_seconds, 1);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load_from(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(config.request_timeout_seconds, 30);
    }
}
