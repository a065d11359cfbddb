//! Media download over HTTP

use crate::error::{ResolverError, Result};
use crate::MediaFetcher;
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for downloading media from playback URLs
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher with a 5 minute timeout
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(300))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { client, timeout }
    }

    fn classify(&self, err: reqwest::Error) -> ResolverError {
        if err.is_timeout() {
            ResolverError::Timeout(self.timeout)
        } else {
            err.into()
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaFetcher for HttpFetcher {
    async fn fetch(&self, playback_url: &str, user_agent: &str) -> Result<Vec<u8>> {
        debug!(url = %playback_url, "Fetching media");

        let response = self
            .client
            .get(playback_url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Failed to fetch media");
            return Err(ResolverError::Status(response.status().as_u16()));
        }

        let data = response.bytes().await.map_err(|e| self.classify(e))?.to_vec();
        debug!(size = data.len(), "Fetched media");
        Ok(data)
    }
}
