//! Environment Configuration Helpers
//!
//! Every process in the pipeline is configured through optional environment
//! variables with stated defaults. A present-but-malformed value is fatal at
//! startup; a missing one never is.

use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// A malformed environment value
#[derive(Debug, Error)]
#[error("Invalid value for {key}: {value:?} ({reason})")]
pub struct ConfigError {
    pub key: String,
    pub value: String,
    pub reason: String,
}

/// Read a string variable, falling back to `default` when unset
pub fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read and parse a variable, falling back to `default` when unset
pub fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError {
            key: key.to_string(),
            value: raw,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
