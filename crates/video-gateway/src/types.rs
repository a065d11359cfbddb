//! Core types for the video gateway

use file_blob_cache::CacheStats;
use serde::{Deserialize, Serialize};

/// API versions served under `/api/{version}/...`
pub const SUPPORTED_VERSIONS: [&str; 1] = ["v2"];

/// Query parameters for the media endpoint
#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}
