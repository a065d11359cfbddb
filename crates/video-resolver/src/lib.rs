//! Video resolution
//!
//! Turns a request query into a playable media download: classifies the query,
//! searches for a video when needed, extracts its direct playback URL, and
//! downloads the bytes. Search and extraction are backed by the `yt-dlp`
//! executable, downloads by `reqwest`.

pub mod error;
pub mod fetch;
pub mod query;
pub mod types;
pub mod ytdlp;

use async_trait::async_trait;

pub use error::{ResolverError, Result};
pub use fetch::HttpFetcher;
pub use query::{watch_url, VideoQuery};
pub use types::VideoInfo;
pub use ytdlp::YtDlp;

/// Desktop browser user agent sent with media downloads
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36 OPR/111.0.0.0";

/// Finds the best-matching video for free text
#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Returns the id of the top result, or `None` when nothing matched
    async fn search(&self, query: &str) -> Result<Option<String>>;
}

/// Extracts metadata, including the direct playback URL, for a video page
#[async_trait]
pub trait VideoExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<VideoInfo>;
}

/// Downloads raw media bytes
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, playback_url: &str, user_agent: &str) -> Result<Vec<u8>>;
}
