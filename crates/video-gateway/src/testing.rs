//! In-memory stand-ins for the resolver collaborators

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use video_resolver::{MediaFetcher, ResolverError, VideoExtractor, VideoInfo, VideoSearch};

#[derive(Default)]
pub struct FakeSearch {
    results: HashMap<String, String>,
    timeout: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeSearch {
    /// Every search fails as if the backend hung
    pub fn timing_out() -> Self {
        Self {
            timeout: Some(Duration::from_secs(60)),
            ..Self::default()
        }
    }

    pub fn with_result(mut self, query: &str, id: &str) -> Self {
        self.results.insert(query.to_string(), id.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoSearch for FakeSearch {
    async fn search(&self, query: &str) -> video_resolver::Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(timeout) = self.timeout {
            return Err(ResolverError::Timeout(timeout));
        }
        Ok(self.results.get(query).cloned())
    }
}

/// Returns a playback URL derived from the page URL, or none at all
pub struct FakeExtractor {
    playback: bool,
    urls: Mutex<Vec<String>>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self {
            playback: true,
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn without_playback_url() -> Self {
        Self {
            playback: false,
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoExtractor for FakeExtractor {
    async fn extract(&self, url: &str) -> video_resolver::Result<VideoInfo> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(VideoInfo {
            id: None,
            title: None,
            url: self
                .playback
                .then(|| format!("https://media.example/play?src={}", url)),
            ext: Some("mp4".to_string()),
        })
    }
}

pub struct FakeFetcher {
    body: Vec<u8>,
    fail_with: Option<u16>,
    pub calls: AtomicUsize,
    user_agents: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn returning(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            fail_with: None,
            calls: AtomicUsize::new(0),
            user_agents: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::returning(b"")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.user_agents.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaFetcher for FakeFetcher {
    async fn fetch(&self, _playback_url: &str, user_agent: &str) -> video_resolver::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.user_agents.lock().unwrap().push(user_agent.to_string());
        match self.fail_with {
            Some(status) => Err(ResolverError::Status(status)),
            None => Ok(self.body.clone()),
        }
    }
}
