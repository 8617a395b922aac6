//! OBD-II Adapter Client
//!
//! Async communication with ELM327-compatible adapters (OBDLink SX and
//! friends) over a USB serial port. Queries a small fixed set of mode-01
//! PIDs plus the adapter's battery voltage, decoding responses with the
//! standard formulas. A scriptable mock ECU backend stands in for the serial
//! port in tests.

mod client;
mod error;
mod pid;

pub use client::{ElmClient, MockEcu};
pub use error::ObdError;
pub use pid::Pid;
