//! Error types for the video gateway

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use file_blob_cache::{BlobCacheError, BlobId};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum GatewayError {
    /// Search found nothing for the query
    QueryResolutionFailed(String),
    /// Extraction succeeded but returned no direct URL
    PlaybackUrlUnavailable,
    UpstreamFetchFailed(String),
    /// The index refers to a blob that is gone from disk
    BlobNotFound(BlobId),
    Cache(BlobCacheError),
    BadRequest(String),
    UnsupportedVersion(String),
    Config(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::QueryResolutionFailed(q) => {
                write!(f, "Cannot find any video for query {:?}", q)
            }
            GatewayError::PlaybackUrlUnavailable => {
                write!(f, "Error: Cannot retrieve playback URL. Maybe try again?")
            }
            GatewayError::UpstreamFetchFailed(msg) => write!(f, "Upstream fetch failed: {}", msg),
            GatewayError::BlobNotFound(id) => write!(f, "Cached video {} is missing", id),
            GatewayError::Cache(err) => write!(f, "Cache error: {}", err),
            GatewayError::BadRequest(msg) => write!(f, "{}", msg),
            GatewayError::UnsupportedVersion(v) => write!(f, "Unsupported API version {:?}", v),
            GatewayError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::Cache(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BlobCacheError> for GatewayError {
    fn from(err: BlobCacheError) -> Self {
        match err {
            BlobCacheError::NotFound(id) => GatewayError::BlobNotFound(id),
            other => GatewayError::Cache(other),
        }
    }
}

impl From<tracing_subscriber::filter::ParseError> for GatewayError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        GatewayError::Config(err.to_string())
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::UnsupportedVersion(_) => StatusCode::NOT_FOUND,
            GatewayError::UpstreamFetchFailed(_) => StatusCode::BAD_GATEWAY,
            GatewayError::QueryResolutionFailed(_)
            | GatewayError::PlaybackUrlUnavailable
            | GatewayError::BlobNotFound(_)
            | GatewayError::Cache(_)
            | GatewayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match &self {
            GatewayError::BlobNotFound(id) => {
                tracing::warn!(blob_id = %id, "Cache index and blob store are out of sync");
            }
            GatewayError::UpstreamFetchFailed(msg) => {
                tracing::error!(error = %msg, "Upstream fetch failed");
            }
            GatewayError::Cache(err) => {
                tracing::error!(error = %err, "Cache error");
            }
            _ => {}
        }

        let status = self.status();
        (
            status,
            Json(ErrorResponse {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
