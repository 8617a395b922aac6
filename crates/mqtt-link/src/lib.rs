//! MQTT Transport Adapter
//!
//! The broker connection is modeled as an injected `Transport` interface so
//! loop timing and sample generation can be tested without a live broker.
//! `MqttTransport` is the real rumqttc-backed implementation; `FakeTransport`
//! is a scriptable in-memory stand-in for tests.

mod backoff;
mod error;
mod fake;
mod mqtt;
mod transport;

pub use backoff::Backoff;
pub use error::TransportError;
pub use fake::{FakeHandle, FakeTransport};
pub use mqtt::{MqttConfig, MqttTransport};
pub use transport::{InboundMessage, Transport};
