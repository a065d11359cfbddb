//! yt-dlp JSON output types

use serde::Deserialize;

/// Metadata for a single video, as dumped by `yt-dlp --dump-single-json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Direct playback URL of the selected format
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
}

impl VideoInfo {
    /// The playback URL, ignoring empty strings
    pub fn playback_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }
}

/// Playlist wrapper returned for `ytsearchN:` pseudo-URLs
#[derive(Debug, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub entries: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SearchEntry {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}
