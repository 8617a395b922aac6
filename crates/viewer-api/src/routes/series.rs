//! Series Listing Route

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;

/// Query parameters for the series endpoint
#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    /// Trailing window in hours
    #[serde(default = "default_hours")]
    pub hours: i64,
}

fn default_hours() -> i64 {
    24
}

/// List series keys seen within the trailing window
pub async fn list_series(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SeriesQuery>,
) -> Json<Vec<String>> {
    let hours = params.hours.clamp(1, 168);
    let cutoff_ms = chrono::Utc::now().timestamp_millis() - hours * 3_600_000;

    Json(state.store.series_since(cutoff_ms).unwrap_or_default())
}
