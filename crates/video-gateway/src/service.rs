//! Request orchestration: sweep, cache lookup, and resolve-then-fetch on miss

use crate::error::{GatewayError, Result};
use file_blob_cache::{BlobCache, CacheStatus};
use std::sync::Arc;
use tracing::{debug, warn};
use video_resolver::{watch_url, MediaFetcher, VideoExtractor, VideoQuery, VideoSearch};

/// Serves media for request queries through the blob cache
pub struct MediaService {
    cache: Arc<BlobCache>,
    search: Arc<dyn VideoSearch>,
    extractor: Arc<dyn VideoExtractor>,
    fetcher: Arc<dyn MediaFetcher>,
    user_agent: String,
}

impl MediaService {
    pub fn new(
        cache: Arc<BlobCache>,
        search: Arc<dyn VideoSearch>,
        extractor: Arc<dyn VideoExtractor>,
        fetcher: Arc<dyn MediaFetcher>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            search,
            extractor,
            fetcher,
            user_agent: user_agent.into(),
        }
    }

    pub fn cache(&self) -> &Arc<BlobCache> {
        &self.cache
    }

    /// Media bytes for `q`, which is also the cache key verbatim
    pub async fn get_media(&self, q: &str) -> Result<(Vec<u8>, CacheStatus)> {
        if q.is_empty() {
            return Err(GatewayError::BadRequest(
                "Missing query parameter \"q\"".to_string(),
            ));
        }

        let expired = self.cache.sweep().await;
        if expired > 0 {
            debug!(expired, "Swept expired cache entries");
        }

        self.cache
            .get_or_fetch(q, || self.resolve_and_fetch(q))
            .await
    }

    /// Page URL for the query, searching only when it is free text
    async fn resolve_url(&self, q: &str) -> Result<String> {
        if let Some(url) = VideoQuery::parse(q).direct_url() {
            return Ok(url);
        }

        match self.search.search(q).await {
            Ok(Some(id)) => Ok(watch_url(&id)),
            Ok(None) => Err(GatewayError::QueryResolutionFailed(q.to_string())),
            Err(e) => {
                warn!(query = %q, error = %e, "Search failed");
                Err(GatewayError::UpstreamFetchFailed(e.to_string()))
            }
        }
    }

    async fn resolve_and_fetch(&self, q: &str) -> Result<Vec<u8>> {
        let page_url = self.resolve_url(q).await?;

        let info = self
            .extractor
            .extract(&page_url)
            .await
            .map_err(|e| GatewayError::UpstreamFetchFailed(e.to_string()))?;
        let playback_url = info
            .playback_url()
            .ok_or(GatewayError::PlaybackUrlUnavailable)?;

        let data = self
            .fetcher
            .fetch(playback_url, &self.user_agent)
            .await
            .map_err(|e| GatewayError::UpstreamFetchFailed(e.to_string()))?;

        debug!(query = %q, url = %page_url, size = data.len(), "Fetched video");
        Ok(data)
    }
}
