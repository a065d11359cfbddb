//! HTTP server for the video gateway
//!
//! Provides /health and /api/{version}/media?q= (also reachable under the
//! older /api/{version}/youtube path).

use crate::error::{GatewayError, Result};
use crate::service::MediaService;
use crate::types::{HealthResponse, MediaQuery, SUPPORTED_VERSIONS};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared state for the HTTP server
pub struct ServerState {
    pub service: MediaService,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(service: MediaService) -> Self {
        Self {
            service,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/{version}/media", get(get_media))
        .route("/api/{version}/youtube", get(get_media))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let cache_stats = state.service.cache().stats().await;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache: cache_stats,
    })
}

/// Get the video for a search query or video URL
async fn get_media(
    State(state): State<SharedState>,
    Path(version): Path<String>,
    Query(query): Query<MediaQuery>,
) -> Result<Response> {
    if !SUPPORTED_VERSIONS.contains(&version.as_str()) {
        return Err(GatewayError::UnsupportedVersion(version));
    }
    let q = query.q.unwrap_or_default();

    let (data, status) = state.service.get_media(&q).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "video/mp4"),
            (HeaderName::from_static("x-cache"), status.as_header()),
        ],
        data,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeExtractor, FakeFetcher, FakeSearch};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use file_blob_cache::{BlobCache, BlobStore, ManualClock, DEFAULT_TTL};
    use std::path::Path as FsPath;
    use tempfile::tempdir;
    use tower::ServiceExt;

    struct TestApp {
        state: SharedState,
        search: Arc<FakeSearch>,
        extractor: Arc<FakeExtractor>,
        fetcher: Arc<FakeFetcher>,
        clock: Arc<ManualClock>,
    }

    impl TestApp {
        fn new(dir: &FsPath, search: FakeSearch, extractor: FakeExtractor, fetcher: FakeFetcher) -> Self {
            let clock = Arc::new(ManualClock::default());
            let cache = Arc::new(BlobCache::with_clock(
                BlobStore::new(dir),
                DEFAULT_TTL,
                clock.clone(),
            ));
            let search = Arc::new(search);
            let extractor = Arc::new(extractor);
            let fetcher = Arc::new(fetcher);
            let service = MediaService::new(
                cache,
                search.clone(),
                extractor.clone(),
                fetcher.clone(),
                video_resolver::DEFAULT_USER_AGENT,
            );
            Self {
                state: Arc::new(ServerState::new(service)),
                search,
                extractor,
                fetcher,
                clock,
            }
        }

        async fn get(&self, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
            let response = create_router(self.state.clone())
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let content_type = response
                .headers()
                .get(header::CONTENT_TYPE)
                .map(|v| v.to_str().unwrap().to_string());
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, content_type, body.to_vec())
        }
    }

    fn message(body: &[u8]) -> String {
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        json["message"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = tempdir().unwrap();
        let app = TestApp::new(
            dir.path(),
            FakeSearch::default(),
            FakeExtractor::new(),
            FakeFetcher::returning(b""),
        );

        let (status, _, body) = app.get("/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json["uptime_secs"].as_u64().is_some());
        assert_eq!(json["cache"]["entries"], 0);
    }

    #[tokio::test]
    async fn test_direct_id_query() {
        let dir = tempdir().unwrap();
        let app = TestApp::new(
            dir.path(),
            FakeSearch::default(),
            FakeExtractor::new(),
            FakeFetcher::returning(b"mp4 bytes"),
        );

        let (status, content_type, body) = app.get("/api/v2/media?q=id%3Dabc123").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("video/mp4"));
        assert_eq!(body, b"mp4 bytes");
        assert_eq!(app.search.calls(), 0);
        assert_eq!(app.extractor.urls(), vec!["https://youtube.com/watch?v=abc123"]);
        assert_eq!(
            app.fetcher.user_agents(),
            vec![video_resolver::DEFAULT_USER_AGENT]
        );
    }

    #[tokio::test]
    async fn test_cache_header() {
        let dir = tempdir().unwrap();
        let app = TestApp::new(
            dir.path(),
            FakeSearch::default(),
            FakeExtractor::new(),
            FakeFetcher::returning(b"mp4 bytes"),
        );

        for expected in ["MISS", "HIT"] {
            let response = create_router(app.state.clone())
                .oneshot(
                    Request::builder()
                        .uri("/api/v2/youtube?q=id%3Dabc123")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()["x-cache"], expected);
        }
        assert_eq!(app.fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_search_without_results() {
        let dir = tempdir().unwrap();
        let app = TestApp::new(
            dir.path(),
            FakeSearch::default(),
            FakeExtractor::new(),
            FakeFetcher::returning(b""),
        );

        let (status, content_type, body) = app.get("/api/v2/media?q=funny%20cat%20video").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert!(message(&body).contains("funny cat video"));
        assert_eq!(app.search.calls(), 1);
    }

    #[tokio::test]
    async fn test_refetch_after_ttl() {
        let dir = tempdir().unwrap();
        let app = TestApp::new(
            dir.path(),
            FakeSearch::default(),
            FakeExtractor::new(),
            FakeFetcher::returning(b"B"),
        );

        let (status, _, _) = app.get("/api/v2/media?q=id%3Dabc123").await;
        assert_eq!(status, StatusCode::OK);
        let cache = app.state.service.cache().clone();
        let old = cache.lookup("id=abc123").await.unwrap();

        app.clock.advance(chrono::Duration::hours(2));
        let (status, _, body) = app.get("/api/v2/media?q=id%3Dabc123").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"B");
        assert_eq!(app.extractor.urls().len(), 2);
        assert_eq!(app.fetcher.calls(), 2);
        assert!(!cache.store().exists(&old.blob_id).await);
        assert_eq!(cache.store().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_playback_url_unavailable() {
        let dir = tempdir().unwrap();
        let app = TestApp::new(
            dir.path(),
            FakeSearch::default(),
            FakeExtractor::without_playback_url(),
            FakeFetcher::returning(b""),
        );

        let (status, _, body) = app.get("/api/v2/media?q=id%3Dabc123").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            message(&body),
            "Error: Cannot retrieve playback URL. Maybe try again?"
        );
    }

    #[tokio::test]
    async fn test_upstream_failure() {
        let dir = tempdir().unwrap();
        let app = TestApp::new(
            dir.path(),
            FakeSearch::default(),
            FakeExtractor::new(),
            FakeFetcher::failing(404),
        );

        let (status, _, body) = app.get("/api/v2/media?q=id%3Dabc123").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(message(&body).contains("404"));
    }

    #[tokio::test]
    async fn test_search_timeout_is_bad_gateway() {
        let dir = tempdir().unwrap();
        let app = TestApp::new(
            dir.path(),
            FakeSearch::timing_out(),
            FakeExtractor::new(),
            FakeFetcher::returning(b""),
        );

        let (status, content_type, body) = app.get("/api/v2/media?q=funny%20cat%20video").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert!(message(&body).contains("Timed out"));
        assert_eq!(app.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_blob_deleted_out_of_band() {
        let dir = tempdir().unwrap();
        let app = TestApp::new(
            dir.path(),
            FakeSearch::default(),
            FakeExtractor::new(),
            FakeFetcher::returning(b"B"),
        );

        app.get("/api/v2/media?q=id%3Dabc123").await;
        let cache = app.state.service.cache().clone();
        let entry = cache.lookup("id=abc123").await.unwrap();
        std::fs::remove_file(cache.store().path_for(&entry.blob_id)).unwrap();

        let (status, _, body) = app.get("/api/v2/media?q=id%3Dabc123").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(message(&body).contains(entry.blob_id.as_str()));
        assert_eq!(app.fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_query() {
        let dir = tempdir().unwrap();
        let app = TestApp::new(
            dir.path(),
            FakeSearch::default(),
            FakeExtractor::new(),
            FakeFetcher::returning(b""),
        );

        let (status, _, body) = app.get("/api/v2/media").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message(&body).contains("q"));
    }

    #[tokio::test]
    async fn test_unsupported_version() {
        let dir = tempdir().unwrap();
        let app = TestApp::new(
            dir.path(),
            FakeSearch::default(),
            FakeExtractor::new(),
            FakeFetcher::returning(b""),
        );

        let (status, _, body) = app.get("/api/v1/media?q=id%3Dabc123").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(message(&body).contains("v1"));
        assert!(app.extractor.urls().is_empty());
    }
}
