//! MQTT Ingestion
//!
//! Subscribes to the telemetry topic filter and fans each payload's fields
//! out into the series store, one point per non-timestamp key. Malformed
//! payloads are skipped, never fatal; transport loss re-enters the
//! connect/backoff cycle.

mod config;
mod ingest;
mod parse;

pub use config::ConsumerConfig;
pub use ingest::Ingestor;
pub use parse::{explode_payload, SeriesPoint};
