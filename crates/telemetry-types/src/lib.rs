//! Shared Telemetry Types
//!
//! Defines the sensor sample entity exchanged over MQTT, its JSON payload
//! codec, the clock abstraction used to keep loop timing testable, and the
//! environment configuration helpers shared by every binary.

mod clock;
mod config;
mod sample;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{env_parse, env_string, ConfigError};
pub use sample::{PayloadError, SensorSample};
