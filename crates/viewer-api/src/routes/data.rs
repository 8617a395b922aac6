//! Data Fetch Route

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use series_store::Point;
use std::collections::HashMap;
use std::sync::Arc;

use crate::AppState;

/// Query parameters for the data endpoint
///
/// `keys` is a comma-separated list; an empty list yields an empty object.
#[derive(Debug, Deserialize)]
pub struct DataQuery {
    #[serde(default)]
    pub keys: String,
    /// Start time (epoch ms, inclusive)
    pub start_ms: i64,
    /// End time (epoch ms, exclusive)
    pub end_ms: i64,
}

/// Fetch ordered points per requested key within a time range
pub async fn get_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DataQuery>,
) -> Json<HashMap<String, Vec<Point>>> {
    let mut result = HashMap::new();

    for key in params
        .keys
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
    {
        let points = state
            .store
            .range(key, params.start_ms, params.end_ms)
            .unwrap_or_default();
        result.insert(key.to_string(), points);
    }

    Json(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use series_store::SeriesStore;

    fn populated_state() -> Arc<AppState> {
        let store = Arc::new(SeriesStore::default());
        for ts in [1000, 2000, 3000] {
            store.insert("rpm", ts, 4000 + ts).unwrap();
            store.insert("speed_kmh", ts, 70).unwrap();
        }
        Arc::new(AppState::new(store))
    }

    #[tokio::test]
    async fn test_requested_keys_are_returned_in_time_order() {
        let query = DataQuery {
            keys: "rpm,speed_kmh".to_string(),
            start_ms: 0,
            end_ms: 10_000,
        };
        let Json(result) = get_data(State(populated_state()), Query(query)).await;

        assert_eq!(result.len(), 2);
        let rpm = &result["rpm"];
        assert_eq!(rpm.len(), 3);
        assert!(rpm.windows(2).all(|w| w[0].timestamp_ms < w[1].timestamp_ms));
    }

    #[tokio::test]
    async fn test_range_bounds_are_half_open() {
        let query = DataQuery {
            keys: "rpm".to_string(),
            start_ms: 1000,
            end_ms: 3000,
        };
        let Json(result) = get_data(State(populated_state()), Query(query)).await;

        assert_eq!(result["rpm"].len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_key_maps_to_empty_series() {
        let query = DataQuery {
            keys: "rpm,missing".to_string(),
            start_ms: 0,
            end_ms: 10_000,
        };
        let Json(result) = get_data(State(populated_state()), Query(query)).await;

        assert!(result["missing"].is_empty());
        assert_eq!(result["rpm"].len(), 3);
    }

    #[tokio::test]
    async fn test_no_keys_yields_empty_object() {
        let query = DataQuery {
            keys: String::new(),
            start_ms: 0,
            end_ms: 10_000,
        };
        let Json(result) = get_data(State(populated_state()), Query(query)).await;
        assert!(result.is_empty());
    }
}
