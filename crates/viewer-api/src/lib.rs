//! Telemetry Viewer Backend
//!
//! Serves the dashboard's two read endpoints over the shared series store,
//! plus a health check and the static frontend. The store is fed by the
//! ingestor task the `viewer` binary runs alongside this server.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod config;
pub mod routes;

pub use config::ViewerConfig;

use series_store::SeriesStore;

/// Application state shared across handlers
pub struct AppState {
    /// The store the ingestor writes into
    pub store: Arc<SeriesStore>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(store: Arc<SeriesStore>) -> Self {
        Self {
            store,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub series_count: usize,
    pub point_count: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>, static_dir: &PathBuf) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/series", get(routes::series::list_series))
        .route("/api/data", get(routes::data::get_data))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        series_count: state.store.series_count(),
        point_count: state.store.point_count(),
    })
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_store_counts() {
        let store = Arc::new(SeriesStore::default());
        store.insert("rpm", 1000, 4500).unwrap();
        store.insert("rpm", 2000, 4600).unwrap();
        let state = Arc::new(AppState::new(store));

        let response = health_handler(State(state)).await.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
