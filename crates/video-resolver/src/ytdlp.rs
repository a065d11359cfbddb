//! Search and playback URL extraction through the `yt-dlp` executable

use crate::error::{ResolverError, Result};
use crate::types::{SearchResults, VideoInfo};
use crate::{VideoExtractor, VideoSearch};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// mp4 first, then the best video-only stream, then whatever is best
const FORMAT: &str = "mp4/bestvideo/best";

/// Runs `yt-dlp` as a subprocess, one invocation per call
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    timeout: Duration,
}

impl YtDlp {
    /// Use `yt-dlp` from `PATH` with a 60 second timeout
    pub fn new() -> Self {
        Self::with_program("yt-dlp", Duration::from_secs(60))
    }

    pub fn with_program(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Run with `args` and return stdout, killing the process on timeout
    async fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| ResolverError::Timeout(self.timeout))?
            .map_err(|e| {
                ResolverError::Extractor(format!("failed to run {:?}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("no output")
                .to_string();
            warn!(status = %output.status, reason = %reason, "yt-dlp failed");
            return Err(ResolverError::Extractor(format!(
                "{} ({})",
                reason, output.status
            )));
        }

        Ok(output.stdout)
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

/// First result id from a `ytsearch1:` dump
pub(crate) fn parse_search(stdout: &[u8]) -> Result<Option<String>> {
    let results: SearchResults = serde_json::from_slice(stdout)?;
    Ok(results.entries.into_iter().next().map(|e| e.id))
}

pub(crate) fn parse_info(stdout: &[u8]) -> Result<VideoInfo> {
    Ok(serde_json::from_slice(stdout)?)
}

#[async_trait]
impl VideoSearch for YtDlp {
    async fn search(&self, query: &str) -> Result<Option<String>> {
        let target = format!("ytsearch1:{}", query);
        debug!(query, "Searching for video");

        let stdout = self
            .run(&[
                "--dump-single-json",
                "--flat-playlist",
                "--quiet",
                "--no-warnings",
                "--",
                target.as_str(),
            ])
            .await?;

        let id = parse_search(&stdout)?;
        debug!(query, id = ?id, "Search finished");
        Ok(id)
    }
}

#[async_trait]
impl VideoExtractor for YtDlp {
    async fn extract(&self, url: &str) -> Result<VideoInfo> {
        debug!(url, "Extracting playback URL");

        let stdout = self
            .run(&[
                "--dump-single-json",
                "--no-playlist",
                "--flat-playlist",
                "--format",
                FORMAT,
                "--quiet",
                "--no-warnings",
                "--",
                url,
            ])
            .await?;

        parse_info(&stdout)
    }
}
