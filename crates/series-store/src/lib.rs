//! Time-Series Store
//!
//! In-memory system of record for ingested telemetry: one bounded,
//! time-ordered queue of points per series key. Serves the two read
//! contracts the dashboard needs: list the keys seen within a trailing
//! window, and fetch ordered `(timestamp, value)` pairs for a time range.

mod store;

pub use store::{Point, SeriesStore, DEFAULT_RETENTION};

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store lock error: {0}")]
    Lock(String),
}
