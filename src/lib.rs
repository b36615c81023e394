//! MediaGrab - Core Library
//!
//! This library provides the core functionality for the video downloader
//! application: URL classification, metadata resolution, the simulated
//! transfer engine, download history, and settings.

pub mod core;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    classifier::UrlClassifier,
    config::AppConfig,
    formats::{find_format, format_catalog, DEFAULT_FORMAT_ID},
    history::HistoryStore,
    metadata::{resolve_descriptor, MetadataFetcher, OEmbedClient},
    models::{
        AppError, AppResult, DownloadHistoryEntry, ParsedSource, TransferSnapshot, TransferStatus,
        VideoDescriptor, VideoFormat, VideoMetadata,
    },
    transfer::{
        event_channel, EventReceiver, EventSender, SimulatedTransfer, TransferEvent,
        TransferTiming,
    },
};

use std::sync::Arc;

/// Application state shared between the UI layer and the core
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<UrlClassifier>,
    pub metadata: Arc<OEmbedClient>,
    pub history: Arc<HistoryStore>,
    pub config: Arc<tokio::sync::RwLock<AppConfig>>,
}

impl AppState {
    /// Build the shared state once at startup. Invalid persisted configuration
    /// falls back to defaults with a warning instead of failing launch.
    pub fn new() -> anyhow::Result<Self> {
        let config = Self::load_or_initialize_config();

        Ok(Self {
            classifier: Arc::new(UrlClassifier::new()),
            metadata: Arc::new(OEmbedClient::new()?),
            history: Arc::new(HistoryStore::open_default()?),
            config: Arc::new(tokio::sync::RwLock::new(config)),
        })
    }

    fn load_or_initialize_config() -> AppConfig {
        match AppConfig::load() {
            Ok(cfg) => {
                if let Err(err) = cfg.validate() {
                    tracing::warn!(
                        "Invalid configuration detected ({}), falling back to defaults",
                        err
                    );
                    let default_cfg = AppConfig::default();
                    if let Err(save_err) = default_cfg.save() {
                        tracing::warn!("Failed to persist default configuration: {}", save_err);
                    }
                    default_cfg
                } else {
                    cfg
                }
            }
            Err(err) => {
                tracing::warn!(
                    "Failed to load configuration from disk: {}. Using defaults",
                    err
                );
                AppConfig::default()
            }
        }
    }
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize the library with default settings
pub fn init() {
    utils::logging::init_tracing();
    tracing::info!("📚 {} v{} initialized", NAME, VERSION);
}
