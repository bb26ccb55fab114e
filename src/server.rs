//! Read-only HTTP access to the persisted price document.
//!
//! The document is re-read on every request and returned exactly as stored.
//! Nothing here validates or rewrites it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{error, info};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::error::{PriceRadarError, Result};
use crate::schema::DISCLAIMER;

pub const API_NAME: &str = "Urban Price Radar API";

#[derive(Debug)]
pub struct ApiError(PriceRadarError);

impl From<PriceRadarError> for ApiError {
    fn from(err: PriceRadarError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Failed to load price document: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

#[derive(Clone)]
pub struct ServerState {
    data_path: Arc<PathBuf>,
}

/// Placeholder returned before any document has been persisted.
pub fn empty_document() -> Value {
    json!({
        "version": "0.0.0",
        "generated_at": null,
        "disclaimer": "No data available",
        "areas": [],
    })
}

pub async fn load_document(path: &Path) -> Result<Value> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(serde_json::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(empty_document()),
        Err(e) => Err(e.into()),
    }
}

async fn get_prices(State(state): State<ServerState>) -> std::result::Result<Json<Value>, ApiError> {
    Ok(Json(load_document(&state.data_path).await?))
}

async fn health(State(state): State<ServerState>) -> std::result::Result<Json<Value>, ApiError> {
    let document = load_document(&state.data_path).await?;
    let areas_count = document
        .get("areas")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    Ok(Json(json!({
        "status": "healthy",
        "version": document.get("version").cloned().unwrap_or_else(|| json!("unknown")),
        "areas_count": areas_count,
        "generated_at": document.get("generated_at").cloned().unwrap_or(Value::Null),
    })))
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": API_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/api/prices": "GET - Returns all price band data",
            "/api/health": "GET - Health check",
        },
        "disclaimer": DISCLAIMER,
    }))
}

pub fn router(data_path: impl Into<PathBuf>) -> Router {
    let state = ServerState {
        data_path: Arc::new(data_path.into()),
    };

    Router::new()
        .route("/", get(root))
        .route("/api/prices", get(get_prices))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(addr: &str, data_path: impl Into<PathBuf>) -> Result<()> {
    let data_path = data_path.into();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "{} listening on {} (serving {})",
        API_NAME,
        addr,
        data_path.display()
    );

    axum::serve(listener, router(data_path)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_prices_served_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prices.json");
        // Deliberately fails strict validation; the server must not care.
        let stored = json!({"version": "1.0.0", "areas": [{"id": "x", "custom": [1, 2]}]});
        std::fs::write(&path, stored.to_string()).unwrap();

        let (status, body) = get_json(router(&path), "/api/prices").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, stored);
    }

    #[tokio::test]
    async fn test_missing_document_placeholder() {
        let dir = TempDir::new().unwrap();
        let app = router(dir.path().join("absent.json"));

        let (_, body) = get_json(app.clone(), "/api/prices").await;
        assert_eq!(body, empty_document());

        let (status, health) = get_json(app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["version"], "0.0.0");
        assert_eq!(health["areas_count"], 0);
        assert!(health["generated_at"].is_null());
    }

    #[tokio::test]
    async fn test_health_reports_document_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prices.json");
        std::fs::write(
            &path,
            r#"{"version": "1.4.0", "generated_at": "2025-01-06T00:30:00Z", "areas": [{}, {}]}"#,
        )
        .unwrap();

        let (_, health) = get_json(router(&path), "/api/health").await;
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["version"], "1.4.0");
        assert_eq!(health["areas_count"], 2);
        assert_eq!(health["generated_at"], "2025-01-06T00:30:00Z");
    }

    #[tokio::test]
    async fn test_corrupt_document_is_server_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prices.json");
        std::fs::write(&path, "{").unwrap();

        let (status, body) = get_json(router(&path), "/api/prices").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let (_, body) = get_json(router("unused.json"), "/").await;
        assert_eq!(body["name"], API_NAME);
        assert!(body["endpoints"]["/api/prices"].is_string());
    }
}
