//! URL and input validation utilities

use anyhow::{anyhow, Result};
use regex::Regex;
use url::Url;

/// Loose domain shape: `label.label...tld` followed by an optional path.
/// Used for scheme-less input that the strict parser cannot see as absolute.
fn domain_like() -> Regex {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]*(\.[A-Za-z0-9][A-Za-z0-9-]*)+(/\S*)?(\?\S*)?$")
        .expect("domain pattern")
}

/// Validate and parse an absolute URL, prefixing `https://` when no scheme is given
pub fn validate_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.contains("://") {
        return Url::parse(trimmed).map_err(|e| anyhow!("Invalid URL format: {}", e));
    }
    Url::parse(&format!("https://{}", trimmed)).map_err(|e| anyhow!("Invalid URL format: {}", e))
}

/// Check whether the input plausibly names a video page.
///
/// Purely syntactic: either the string parses as an absolute http(s) URL, or it
/// looks like a bare domain with an optional path. No network access.
pub fn is_plausible_url(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return false;
    }

    if trimmed.contains("://") {
        return match Url::parse(trimmed) {
            Ok(parsed) => {
                let scheme = parsed.scheme();
                (scheme == "http" || scheme == "https") && parsed.has_host()
            }
            Err(_) => false,
        };
    }

    domain_like().is_match(trimmed)
}
