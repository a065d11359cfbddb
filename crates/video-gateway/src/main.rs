//! Video Gateway - serves videos for search queries or video URLs
//!
//! Resolves a query to a playable video, downloads it, and keeps the bytes in
//! a temporary on-disk cache so popular queries are not refetched.

mod config;
mod error;
mod server;
mod service;
#[cfg(test)]
mod testing;
mod types;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::server::{start_server, ServerState, SharedState};
use crate::service::MediaService;
use file_blob_cache::BlobCache;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};
use video_resolver::{HttpFetcher, YtDlp};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("video_gateway=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting Video Gateway...");

    let config = GatewayConfig::from_env();
    info!("Port: {}", config.port);
    info!("Cache dir: {:?}", config.cache_dir);
    info!("Cache TTL: {} seconds", config.cache_ttl_secs);
    info!("yt-dlp: {:?}", config.yt_dlp_path);

    let cache = Arc::new(BlobCache::new(config.cache_dir.clone(), config.cache_ttl()));
    cache.init().await?;

    if config.reconcile_on_start {
        cache.reconcile().await?;
    }

    if let Some(every) = config.sweep_interval() {
        info!("Background sweep every {} seconds", every.as_secs());
        cache.spawn_sweeper(every);
    }

    let ytdlp = Arc::new(YtDlp::with_program(
        config.yt_dlp_path.clone(),
        config.upstream_timeout(),
    ));
    let fetcher = Arc::new(HttpFetcher::with_timeout(config.fetch_timeout()));
    let service = MediaService::new(
        cache,
        ytdlp.clone(),
        ytdlp,
        fetcher,
        config.user_agent.clone(),
    );

    let state: SharedState = Arc::new(ServerState::new(service));

    // Start HTTP server (blocking)
    start_server(state, config.port)
        .await
        .map_err(|e| GatewayError::Config(format!("Server error: {}", e)))?;

    Ok(())
}
