//! Telemetry Publisher Loop
//!
//! Drives a sampler at a fixed cadence and hands each sample to the broker
//! transport. Two samplers exist: the simulated signal bank (all channels,
//! every tick) and the OBD adapter reader (whatever the vehicle answers).
//! Transport loss is never fatal; the loop falls back to connecting and
//! resumes once the broker is reachable again.

mod config;
mod publisher;
mod sampler;

pub use config::{ObdLinkConfig, PublisherConfig};
pub use publisher::PublisherLoop;
pub use sampler::{ObdSampler, Sampler, SimSampler};

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging for a publisher binary
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
