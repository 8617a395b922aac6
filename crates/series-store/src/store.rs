//! Store Implementation

use crate::StoreError;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tracing::{debug, info};

/// Default per-series retention cap
pub const DEFAULT_RETENTION: usize = 100_000;

/// One stored observation
///
/// Serializes as the dashboard wire shape: `{"ts": <epoch ms>, "v": <int>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    #[serde(rename = "ts")]
    pub timestamp_ms: i64,
    #[serde(rename = "v")]
    pub value: i64,
}

/// Keyed store of bounded, time-ordered point queues
pub struct SeriesStore {
    series: Mutex<HashMap<String, VecDeque<Point>>>,
    max_points_per_series: usize,
}

impl SeriesStore {
    pub fn new(max_points_per_series: usize) -> Self {
        info!(
            "Creating in-memory series store (retention {} points/series)",
            max_points_per_series
        );
        Self {
            series: Mutex::new(HashMap::new()),
            max_points_per_series,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, VecDeque<Point>>>, StoreError>
    {
        self.series
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    /// Insert one point, keeping the series ordered and bounded
    ///
    /// Points may arrive slightly out of order across publishers; they are
    /// placed by timestamp, not arrival.
    pub fn insert(&self, key: &str, timestamp_ms: i64, value: i64) -> Result<(), StoreError> {
        let mut series = self.lock()?;
        let queue = series.entry(key.to_string()).or_default();

        while queue.len() >= self.max_points_per_series {
            queue.pop_front();
        }

        let point = Point {
            timestamp_ms,
            value,
        };
        let out_of_order = queue
            .back()
            .map(|last| last.timestamp_ms > timestamp_ms)
            .unwrap_or(false);
        if out_of_order {
            let pos = queue
                .iter()
                .rposition(|p| p.timestamp_ms <= timestamp_ms)
                .map(|i| i + 1)
                .unwrap_or(0);
            debug!("Out-of-order point for {} placed at index {}", key, pos);
            queue.insert(pos, point);
        } else {
            queue.push_back(point);
        }

        Ok(())
    }

    /// Keys with at least one point at or after `cutoff_ms`, sorted
    pub fn series_since(&self, cutoff_ms: i64) -> Result<Vec<String>, StoreError> {
        let series = self.lock()?;
        let mut keys: Vec<String> = series
            .iter()
            .filter(|(_, queue)| {
                queue
                    .back()
                    .map(|p| p.timestamp_ms >= cutoff_ms)
                    .unwrap_or(false)
            })
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Ordered points for `key` within `[start_ms, end_ms)`
    ///
    /// An unknown key is an empty series, not an error.
    pub fn range(&self, key: &str, start_ms: i64, end_ms: i64) -> Result<Vec<Point>, StoreError> {
        let series = self.lock()?;
        Ok(series
            .get(key)
            .map(|queue| {
                queue
                    .iter()
                    .filter(|p| p.timestamp_ms >= start_ms && p.timestamp_ms < end_ms)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Number of distinct series keys
    pub fn series_count(&self) -> usize {
        self.series.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Total stored points across all series
    pub fn point_count(&self) -> usize {
        self.series
            .lock()
            .map(|s| s.values().map(VecDeque::len).sum())
            .unwrap_or(0)
    }

    /// Drop everything (for tests)
    pub fn clear(&self) {
        if let Ok(mut series) = self.series.lock() {
            series.clear();
        }
    }
}

impl Default for SeriesStore {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_range() {
        let store = SeriesStore::default();
        for ts in [1000, 2000, 3000] {
            store.insert("rpm", ts, ts / 10).unwrap();
        }

        let points = store.range("rpm", 1000, 3000).unwrap();
        assert_eq!(points.len(), 2); // end bound is exclusive
        assert_eq!(points[0].timestamp_ms, 1000);
        assert_eq!(points[1].value, 200);
    }

    #[test]
    fn test_unknown_key_is_empty() {
        let store = SeriesStore::default();
        assert!(store.range("nope", 0, i64::MAX).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_order_insert_is_placed_by_timestamp() {
        let store = SeriesStore::default();
        store.insert("speed_kmh", 3000, 3).unwrap();
        store.insert("speed_kmh", 1000, 1).unwrap();
        store.insert("speed_kmh", 2000, 2).unwrap();

        let points = store.range("speed_kmh", 0, i64::MAX).unwrap();
        let values: Vec<i64> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_retention_cap() {
        let store = SeriesStore::new(5);
        for ts in 0..10 {
            store.insert("rpm", ts, ts).unwrap();
        }

        let points = store.range("rpm", 0, i64::MAX).unwrap();
        assert_eq!(points.len(), 5);
        assert_eq!(points[0].timestamp_ms, 5); // oldest dropped first
    }

    #[test]
    fn test_series_since_window() {
        let store = SeriesStore::default();
        store.insert("rpm", 10_000, 1).unwrap();
        store.insert("oil_temp_c", 1_000, 130).unwrap();

        assert_eq!(store.series_since(5_000).unwrap(), vec!["rpm"]);
        let all = store.series_since(0).unwrap();
        assert_eq!(all, vec!["oil_temp_c", "rpm"]); // sorted
    }

    #[test]
    fn test_counts() {
        let store = SeriesStore::default();
        store.insert("a", 1, 1).unwrap();
        store.insert("a", 2, 2).unwrap();
        store.insert("b", 1, 1).unwrap();

        assert_eq!(store.series_count(), 2);
        assert_eq!(store.point_count(), 3);

        store.clear();
        assert_eq!(store.point_count(), 0);
    }
}
