//! In-Memory Fake Transport
//!
//! Scriptable stand-in for a broker connection. Tests hold a `FakeHandle` to
//! inject failures and inbound traffic and to assert on what was delivered,
//! while the loop under test owns the `FakeTransport` itself.

use crate::error::TransportError;
use crate::transport::{InboundMessage, Transport};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

const INBOUND_CAP: usize = 64;

#[derive(Default)]
struct FakeState {
    connected: bool,
    connect_attempts: usize,
    failing_connects: usize,
    publish_failures_pending: usize,
    published: Vec<(String, Vec<u8>)>,
    subscriptions: Vec<String>,
}

/// Fake broker connection
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
    inbound_rx: mpsc::Receiver<InboundMessage>,
}

/// Test-side handle to script and observe a `FakeTransport`
#[derive(Clone)]
pub struct FakeHandle {
    state: Arc<Mutex<FakeState>>,
    inbound_tx: mpsc::Sender<InboundMessage>,
}

impl FakeTransport {
    pub fn new() -> (Self, FakeHandle) {
        let state = Arc::new(Mutex::new(FakeState::default()));
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAP);

        let transport = Self {
            state: Arc::clone(&state),
            inbound_rx,
        };
        let handle = FakeHandle { state, inbound_tx };
        (transport, handle)
    }
}

impl FakeHandle {
    /// Make the next `count` connect attempts fail
    pub fn fail_next_connects(&self, count: usize) {
        self.state.lock().unwrap().failing_connects = count;
    }

    /// Make the next `count` publish attempts fail and drop the connection
    pub fn fail_next_publishes(&self, count: usize) {
        self.state.lock().unwrap().publish_failures_pending = count;
    }

    /// Deliver a message to the transport's subscriber side
    pub async fn inject(&self, topic: &str, payload: &[u8]) {
        self.inbound_tx
            .send(InboundMessage {
                topic: topic.to_string(),
                payload: payload.to_vec(),
            })
            .await
            .expect("fake transport dropped");
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }

    pub fn connect_attempts(&self) -> usize {
        self.state.lock().unwrap().connect_attempts
    }

    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.state.lock().unwrap().published.clone()
    }

    pub fn publish_count(&self) -> usize {
        self.state.lock().unwrap().published.len()
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.state.lock().unwrap().subscriptions.clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        state.connect_attempts += 1;

        if state.failing_connects > 0 {
            state.failing_connects -= 1;
            return Err(TransportError::Connect("scripted refusal".to_string()));
        }

        state.connected = true;
        Ok(())
    }

    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();

        if !state.connected {
            return Err(TransportError::NotConnected);
        }

        if state.publish_failures_pending > 0 {
            state.publish_failures_pending -= 1;
            state.connected = false;
            return Err(TransportError::Publish("scripted broker drop".to_string()));
        }

        state.published.push((topic.to_string(), payload.to_vec()));
        Ok(())
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        if !state.connected {
            return Err(TransportError::NotConnected);
        }
        state.subscriptions.push(topic.to_string());
        Ok(())
    }

    async fn next_message(&mut self) -> Result<InboundMessage, TransportError> {
        self.inbound_rx
            .recv()
            .await
            .ok_or(TransportError::ChannelClosed)
    }

    fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }

    async fn disconnect(&mut self) {
        self.state.lock().unwrap().connected = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_requires_connection() {
        let (mut transport, _handle) = FakeTransport::new();
        let err = transport.publish("t", b"x").await.unwrap_err();
        assert!(matches!(err, TransportError::NotConnected));

        transport.connect().await.unwrap();
        transport.publish("t", b"x").await.unwrap();
    }

    #[tokio::test]
    async fn test_scripted_connect_failures_then_success() {
        let (mut transport, handle) = FakeTransport::new();
        handle.fail_next_connects(2);

        assert!(transport.connect().await.is_err());
        assert!(transport.connect().await.is_err());
        assert!(transport.connect().await.is_ok());
        assert_eq!(handle.connect_attempts(), 3);
    }

    #[tokio::test]
    async fn test_publish_failure_drops_connection() {
        let (mut transport, handle) = FakeTransport::new();
        transport.connect().await.unwrap();
        handle.fail_next_publishes(1);

        assert!(transport.publish("t", b"x").await.is_err());
        assert!(!transport.is_connected());
        assert_eq!(handle.publish_count(), 0);
    }

    #[tokio::test]
    async fn test_injected_messages_arrive_in_order() {
        let (mut transport, handle) = FakeTransport::new();
        handle.inject("a/b", b"one").await;
        handle.inject("a/c", b"two").await;

        assert_eq!(transport.next_message().await.unwrap().payload, b"one");
        assert_eq!(transport.next_message().await.unwrap().topic, "a/c");
    }
}
