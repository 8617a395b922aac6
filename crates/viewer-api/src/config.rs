//! Viewer Configuration

use series_store::DEFAULT_RETENTION;
use std::path::PathBuf;
use telemetry_types::{env_parse, env_string, ConfigError};

/// Settings for the viewer process
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// HTTP listen address
    pub addr: String,
    /// Directory holding the dashboard frontend
    pub static_dir: PathBuf,
    /// Per-series retention cap for the in-memory store
    pub retention: usize,
}

impl ViewerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            addr: env_string("VIEWER_ADDR", "0.0.0.0:8000"),
            static_dir: PathBuf::from(env_string(
                "VIEWER_STATIC_DIR",
                "crates/viewer-api/static",
            )),
            retention: env_parse("SERIES_RETENTION", DEFAULT_RETENTION)?,
        })
    }
}
