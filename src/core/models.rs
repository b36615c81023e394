//! Core data models for the video downloader application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transfer status enumeration

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransferStatus {
    Preparing,

    Downloading,

    Paused,

    Complete,
}

/// Classification result for a submitted URL

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]

pub struct ParsedSource {
    /// Platform-specific content identifier, or a generated opaque token
    pub id: String,

    /// Lowercase platform tag (e.g. "youtube"), or a bare domain as fallback
    pub platform: String,
}

/// Selectable output format entry from the static catalog

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]

pub struct VideoFormat {
    pub id: String,

    pub quality: String,

    pub resolution: String,

    pub file_size: u64,
}

/// Raw metadata returned by the oEmbed lookup collaborator

#[derive(Debug, Clone, Default, Serialize, Deserialize)]

pub struct VideoMetadata {
    pub title: Option<String>,

    pub thumbnail_url: Option<String>,

    pub author_name: Option<String>,

    pub duration_seconds: Option<u64>,
}

/// Fully resolved video descriptor handed to the transfer engine

#[derive(Debug, Clone, Serialize, Deserialize)]

pub struct VideoDescriptor {
    pub url: String,

    pub platform: String,

    pub content_id: String,

    pub title: String,

    pub thumbnail_url: Option<String>,

    pub duration_seconds: Option<u64>,
}

/// Point-in-time view of a simulated transfer

#[derive(Debug, Clone, Serialize, Deserialize)]

pub struct TransferSnapshot {
    pub transfer_id: String,

    pub status: TransferStatus,

    /// 0.0 - 100.0, monotonically non-decreasing while downloading
    pub progress_percent: f64,

    pub total_bytes: u64,

    pub downloaded_bytes: u64,

    /// Simulated seconds spent downloading (one per tick, pauses excluded)
    pub elapsed_seconds: u64,

    pub eta_seconds: Option<u64>,

    /// Display-only instantaneous speed in bytes per second
    pub speed_bps: f64,
}

/// Persisted record of a finished transfer

#[derive(Debug, Clone, Serialize, Deserialize)]

pub struct DownloadHistoryEntry {
    pub id: String,

    pub title: String,

    pub thumbnail_url: Option<String>,

    pub url: String,

    pub format: String,

    pub download_date: DateTime<Utc>,

    pub file_path: Option<String>,

    pub file_size: Option<u64>,

    pub duration_seconds: Option<u64>,
}

/// Application error types

#[derive(Debug, thiserror::Error)]

pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Transfer error: {0}")]
    Transfer(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for application operations

pub type AppResult<T> = Result<T, AppError>;
