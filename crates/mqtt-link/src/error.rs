//! Transport Error Types

use thiserror::Error;

/// Errors reported by a broker transport
///
/// All variants are recoverable: callers re-enter their connect cycle rather
/// than exiting.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Broker unreachable or connection handshake failed
    #[error("Broker connect failed: {0}")]
    Connect(String),

    /// Operation attempted while the connection is down
    #[error("Not connected to broker")]
    NotConnected,

    /// Delivery attempt failed
    #[error("Publish failed: {0}")]
    Publish(String),

    /// Subscription request failed
    #[error("Subscribe failed: {0}")]
    Subscribe(String),

    /// The transport's event task is gone; the connection must be rebuilt
    #[error("Transport event channel closed")]
    ChannelClosed,
}
