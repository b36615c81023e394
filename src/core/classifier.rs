//! URL classification for supported video platforms
//!
//! Maps a raw URL string to a platform tag plus a content identifier by trying
//! an ordered list of platform patterns. Unrecognized but plausible URLs fall
//! back to the bare domain with a generated opaque token, so classification
//! never fails for input that passed validation.

use rand::Rng;
use regex::Regex;
use tracing::debug;

use crate::core::models::{AppError, AppResult, ParsedSource};
use crate::utils::validation::{is_plausible_url, validate_url};

/// One platform recognizer: a tag plus the pattern that extracts its content id.
struct PlatformPattern {
    platform: &'static str,
    regex: Regex,
}

/// Ordered platform pattern table. Patterns are tried in declared order and the
/// first match wins; hostnames match case-insensitively while extracted ids
/// keep their input casing.
pub struct UrlClassifier {
    patterns: Vec<PlatformPattern>,
}

/// Length of the opaque token generated for domain-fallback classifications.
const FALLBACK_ID_LEN: usize = 8;

const BASE36_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

impl UrlClassifier {
    /// Build the classifier with the full platform pattern table.
    pub fn new() -> Self {
        // Declared order is the matching priority. Patterns with two capture
        // groups cover a canonical and a short-link form; the extractor takes
        // whichever group is populated.
        let table: [(&'static str, &'static str); 10] = [
            (
                "youtube",
                r"(?i)\byoutube\.com/(?:watch\?(?:[^#\s]*&)?v=|embed/|shorts/|v/)([A-Za-z0-9_-]{11})",
            ),
            ("youtube", r"(?i)\byoutu\.be/([A-Za-z0-9_-]{11})"),
            (
                "vimeo",
                r"(?i)\bvimeo\.com/(?:video/|channels/[^/]+/|groups/[^/]+/videos/)?(\d+)",
            ),
            // dai.ly short ids carry an optional slug after an underscore; the
            // id charset stops the capture at the first underscore.
            (
                "dailymotion",
                r"(?i)(?:\bdailymotion\.com/video/|\bdai\.ly/)([A-Za-z0-9]+)",
            ),
            (
                "facebook",
                r"(?i)(?:\bfacebook\.com/(?:[^/]+/videos/(?:[^/]+/)?|watch/?\?(?:[^#\s]*&)?v=|video\.php\?(?:[^#\s]*&)?v=)(\d+)|\bfb\.watch/([A-Za-z0-9_-]+))",
            ),
            (
                "twitter",
                r"(?i)(?:\btwitter\.com|\bx\.com)/[^/]+/status(?:es)?/(\d+)",
            ),
            (
                "tiktok",
                r"(?i)(?:\btiktok\.com/@[^/]+/video/(\d+)|\b(?:vm|vt)\.tiktok\.com/([A-Za-z0-9]+))",
            ),
            (
                "instagram",
                r"(?i)\binstagram\.com/(?:p|reel|reels|tv)/([A-Za-z0-9_-]+)",
            ),
            (
                "pornhub",
                r"(?i)\bpornhub\.com/view_video\.php\?(?:[^#\s]*&)?viewkey=([A-Za-z0-9]+)",
            ),
            (
                "reddit",
                r"(?i)\breddit\.com/r/[^/]+/comments/([A-Za-z0-9]+)",
            ),
        ];

        let patterns = table
            .into_iter()
            .map(|(platform, pattern)| PlatformPattern {
                platform,
                regex: Regex::new(pattern).expect("platform pattern"),
            })
            .collect();

        Self { patterns }
    }

    /// Check whether the input plausibly names a video page.
    pub fn is_plausible_url(&self, input: &str) -> bool {
        is_plausible_url(input)
    }

    /// Classify a URL into a platform tag and content id.
    ///
    /// Returns `AppError::InvalidUrl` for input that fails the plausibility
    /// check; this is the only error this component produces.
    pub fn classify(&self, url: &str) -> AppResult<ParsedSource> {
        let trimmed = url.trim();
        if !is_plausible_url(trimmed) {
            return Err(AppError::InvalidUrl(trimmed.to_string()));
        }

        for pattern in &self.patterns {
            if let Some(captures) = pattern.regex.captures(trimmed) {
                // First populated capture group wins (canonical vs short-link).
                let id = captures
                    .iter()
                    .skip(1)
                    .flatten()
                    .map(|m| m.as_str())
                    .find(|s| !s.is_empty());

                if let Some(id) = id {
                    debug!("Classified {} as {} ({})", trimmed, pattern.platform, id);
                    return Ok(ParsedSource {
                        id: id.to_string(),
                        platform: pattern.platform.to_string(),
                    });
                }
            }
        }

        let source = fallback_source(trimmed);
        debug!(
            "No platform pattern matched {}, falling back to domain {}",
            trimmed, source.platform
        );
        Ok(source)
    }
}

impl Default for UrlClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Degraded classification: the registrable domain as the platform tag plus a
/// generated opaque id.
fn fallback_source(url: &str) -> ParsedSource {
    let host = validate_url(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string));

    let platform = match host.as_deref() {
        Some(host) => {
            let host = host.trim_start_matches("www.").trim_end_matches('.');
            if host.is_empty() {
                "unknown".to_string()
            } else {
                host.to_ascii_lowercase()
            }
        }
        None => "unknown".to_string(),
    };

    ParsedSource {
        id: random_token(FALLBACK_ID_LEN),
        platform,
    }
}

/// Short base-36 token for ids that have no platform pattern to extract from.
fn random_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36_ALPHABET[rng.gen_range(0..BASE36_ALPHABET.len())] as char)
        .collect()
}
