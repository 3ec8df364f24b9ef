//! Sanitization for untrusted scraped content.
//!
//! Everything coming off a venue site is treated as hostile until stripped:
//! HTML tags are removed, whitespace collapsed, lengths capped, and URLs
//! checked against a scheme allowlist before anything reaches the output.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

pub const MAX_URL_LENGTH: usize = 500;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const DANGEROUS_SCHEMES: [&str; 6] = [
    "javascript:",
    "data:",
    "vbscript:",
    "file:",
    "about:",
    "blob:",
];

/// Remove all HTML tags and limit length.
///
/// Uses ammonia with an empty tag allowlist, which strips every element and
/// drops script/style content entirely.
pub fn sanitize_text(text: &str, max_length: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let builder = {
        let mut b = ammonia::Builder::empty();
        b.tags(HashSet::new());
        b
    };
    let cleaned = builder.clean(text).to_string();

    // ammonia leaves entities encoded; decode the common ones for display
    let cleaned = cleaned
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let cleaned = WHITESPACE_RE.replace_all(&cleaned, " ").trim().to_string();

    if cleaned.chars().count() > max_length {
        let truncated: String = cleaned.chars().take(max_length.saturating_sub(3)).collect();
        format!("{truncated}...")
    } else {
        cleaned
    }
}

/// Validate a URL against the http/https allowlist.
///
/// Returns an empty string for dangerous schemes (javascript:, data:, ...),
/// over-long URLs, and anything that is not plain http(s).
pub fn sanitize_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || url.chars().count() > MAX_URL_LENGTH {
        return String::new();
    }

    let lower = url.to_ascii_lowercase();
    if DANGEROUS_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return String::new();
    }
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return String::new();
    }

    url.to_string()
}
