//! Broker Transport Interface

use crate::error::TransportError;
use async_trait::async_trait;

/// A message received from a subscribed topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Injected broker connection
///
/// Owned exclusively by one loop for the process lifetime: acquired at
/// startup, released on shutdown, re-acquired after a detected disconnect.
#[async_trait]
pub trait Transport: Send {
    /// Establish (or re-establish) the broker connection
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Deliver one message on `topic`
    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError>;

    /// Register interest in a topic filter
    ///
    /// Subscriptions survive reconnects: the transport re-issues them when
    /// the broker accepts a new session.
    async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;

    /// Wait for the next message on any subscribed topic
    async fn next_message(&mut self) -> Result<InboundMessage, TransportError>;

    /// Whether the broker connection is currently up
    fn is_connected(&self) -> bool;

    /// Release the connection
    async fn disconnect(&mut self);
}
