//! Video metadata lookup
//!
//! Resolves a title and thumbnail for a classified URL through an oEmbed-style
//! lookup. Lookup failures are never surfaced: the resolver degrades to
//! platform thumbnail templates and a generic title so a usable descriptor
//! always comes back.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::core::models::{AppError, AppResult, ParsedSource, VideoDescriptor, VideoMetadata};

/// Aggregated oEmbed endpoint covering the supported platforms.
const OEMBED_ENDPOINT: &str = "https://noembed.com/embed";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Title/thumbnail resolution capability consumed by the descriptor resolver.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch_metadata(&self, url: &str) -> AppResult<VideoMetadata>;
}

/// oEmbed lookup backed by an HTTP client.
pub struct OEmbedClient {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,

    thumbnail_url: Option<String>,

    author_name: Option<String>,

    // noembed reports provider-side failures in-band
    error: Option<String>,
}

impl OEmbedClient {
    pub fn new() -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("mediagrab/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: OEMBED_ENDPOINT.to_string(),
        })
    }
}

#[async_trait]
impl MetadataFetcher for OEmbedClient {
    async fn fetch_metadata(&self, url: &str) -> AppResult<VideoMetadata> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", url)])
            .send()
            .await?
            .error_for_status()?;

        let body: OEmbedResponse = response.json().await?;

        if let Some(error) = body.error {
            return Err(AppError::Metadata(format!(
                "oEmbed lookup failed for {}: {}",
                url, error
            )));
        }

        Ok(VideoMetadata {
            title: body.title,
            thumbnail_url: body.thumbnail_url,
            author_name: body.author_name,
            duration_seconds: None,
        })
    }
}

/// Build the descriptor handed to the transfer engine.
///
/// Always succeeds: any lookup error or missing field degrades to the template
/// values derived from the classification alone.
pub async fn resolve_descriptor(
    fetcher: &dyn MetadataFetcher,
    url: &str,
    source: &ParsedSource,
) -> VideoDescriptor {
    let metadata = match fetcher.fetch_metadata(url).await {
        Ok(metadata) => metadata,
        Err(e) => {
            debug!("Metadata lookup failed for {}: {}", url, e);
            VideoMetadata::default()
        }
    };

    VideoDescriptor {
        url: url.to_string(),
        platform: source.platform.clone(),
        content_id: source.id.clone(),
        title: metadata
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| fallback_title(&source.platform)),
        thumbnail_url: metadata
            .thumbnail_url
            .filter(|t| !t.trim().is_empty())
            .or_else(|| fallback_thumbnail(&source.platform, &source.id)),
        duration_seconds: metadata.duration_seconds,
    }
}

fn fallback_title(platform: &str) -> String {
    format!("Video from {}", platform)
}

/// Deterministic per-platform thumbnail URL templates.
fn fallback_thumbnail(platform: &str, id: &str) -> Option<String> {
    match platform {
        "youtube" => Some(format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id)),
        "vimeo" => Some(format!("https://vumbnail.com/{}.jpg", id)),
        "dailymotion" => Some(format!(
            "https://www.dailymotion.com/thumbnail/video/{}",
            id
        )),
        _ => None,
    }
}
