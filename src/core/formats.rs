//! Static catalog of selectable output formats
//!
//! The catalog is fixed configuration: the UI offers these entries for every
//! video and the selected entry's size drives the simulated transfer.

use crate::core::models::VideoFormat;

const MB: u64 = 1024 * 1024;

/// Default format offered when the user has not picked one.
pub const DEFAULT_FORMAT_ID: &str = "mp4-720";

/// The selectable format catalog, highest quality first.
pub fn format_catalog() -> Vec<VideoFormat> {
    vec![
        VideoFormat {
            id: "mp4-1080".to_string(),
            quality: "1080p".to_string(),
            resolution: "1920x1080".to_string(),
            file_size: 126 * MB,
        },
        VideoFormat {
            id: "mp4-720".to_string(),
            quality: "720p".to_string(),
            resolution: "1280x720".to_string(),
            file_size: 84 * MB,
        },
        VideoFormat {
            id: "mp4-480".to_string(),
            quality: "480p".to_string(),
            resolution: "854x480".to_string(),
            file_size: 52 * MB,
        },
        VideoFormat {
            id: "mp4-360".to_string(),
            quality: "360p".to_string(),
            resolution: "640x360".to_string(),
            file_size: 31 * MB,
        },
        VideoFormat {
            id: "mp3-audio".to_string(),
            quality: "Audio Only".to_string(),
            resolution: "audio".to_string(),
            file_size: 9 * MB,
        },
    ]
}

/// Look up a catalog entry by id.
pub fn find_format(format_id: &str) -> Option<VideoFormat> {
    format_catalog().into_iter().find(|f| f.id == format_id)
}
