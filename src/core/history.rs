//! Download history persistence
//!
//! Serialized, newest-first list of finished transfers under a fixed storage
//! key. Loads are tolerant: malformed entries are dropped one by one instead
//! of failing the whole list.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::models::DownloadHistoryEntry;

/// Fixed namespace key the history list is stored under.
pub const HISTORY_STORE_KEY: &str = "download-history";

/// Durable key-value store for the download history list.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Open the store at its default location in the platform data directory.
    pub fn open_default() -> Result<Self> {
        let project_dirs = ProjectDirs::from("com", "mediagrab", "app")
            .with_context(|| "Failed to get project directories")?;

        let path = project_dirs
            .data_dir()
            .join(format!("{}.json", HISTORY_STORE_KEY));
        Ok(Self { path })
    }

    /// Open the store at an explicit path (used by tests).
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the history list, newest first. A missing file is an empty list;
    /// malformed entries are dropped with a warning.
    pub fn load(&self) -> Vec<DownloadHistoryEntry> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Failed to read history file {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        let values: Vec<serde_json::Value> = match serde_json::from_str(&content) {
            Ok(values) => values,
            Err(e) => {
                warn!("History file {:?} is not a JSON list: {}", self.path, e);
                return Vec::new();
            }
        };

        let total = values.len();
        let entries: Vec<DownloadHistoryEntry> = values
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Dropping malformed history entry: {}", e);
                    None
                }
            })
            .collect();

        if entries.len() < total {
            warn!(
                "Loaded {} of {} history entries from {:?}",
                entries.len(),
                total,
                self.path
            );
        }
        entries
    }

    /// Persist the full history list.
    pub fn save(&self, entries: &[DownloadHistoryEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create history directory: {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(entries)
            .with_context(|| "Failed to serialize history")?;

        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write history file: {:?}", self.path))?;
        Ok(())
    }

    /// Prepend a finished transfer to the list.
    pub fn append(&self, entry: DownloadHistoryEntry) -> Result<()> {
        let mut entries = self.load();
        entries.insert(0, entry);
        self.save(&entries)
    }

    /// Remove every history entry.
    pub fn clear(&self) -> Result<()> {
        self.save(&[])
    }
}
